//! Puzzle Mode Tests

use study_tree::puzzle::PuzzleProgress;
use study_tree::{
    Engine, EngineConfig, Error, GameStatus, NodeMark, Puzzle, PuzzleSet, PuzzleState,
    PuzzleVerdict, Side,
};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn lines(lines: &[&[&str]]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|line| line.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn open_game_puzzle() -> Puzzle {
    Puzzle::new("open-game", lines(&[&["e4", "e5", "Nf3"]])).with_player(Side::White)
}

fn engine_with(puzzle: Puzzle) -> Engine {
    let mut engine = Engine::new();
    engine.load_puzzle(puzzle).unwrap();
    engine
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_correct_move_plays_reply() {
    let mut engine = engine_with(open_game_puzzle());

    let outcome = engine.submit_move("e4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Correct { alternate: false }));
    let reply = outcome.reply.unwrap();
    assert_eq!(engine.cursor(), reply);
    assert_eq!(engine.current().san(), Some("e5"));
    assert_eq!(engine.tree().node(outcome.node).unwrap().mark(), Some(NodeMark::Solution));
    assert_eq!(engine.current().mark(), Some(NodeMark::Solution));

    let outcome = engine.submit_move("Nf3").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: false }));
    assert_eq!(outcome.reply, None);
    assert_eq!(engine.puzzle_progress().unwrap().state, PuzzleState::Solved);
    assert_eq!(engine.last_result(), Some(PuzzleVerdict::Solved { alternate: false }));
}

#[test]
fn test_wrong_move_and_retry() {
    let mut engine = engine_with(open_game_puzzle());

    let outcome = engine.submit_move("d4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Incorrect));
    assert_eq!(outcome.reply, None);
    let deviation = outcome.node;
    assert_eq!(engine.tree().node(deviation).unwrap().mark(), Some(NodeMark::Deviation));
    assert_eq!(
        engine.puzzle_progress(),
        Some(PuzzleProgress {
            state: PuzzleState::Failed,
            mistakes: 1,
            hints: 0,
        })
    );

    let target = engine.reset_to_last_correct().unwrap();
    assert_eq!(target, engine.tree().root());
    assert_eq!(engine.cursor(), target);
    assert!(engine.tree().contains(deviation));
    assert_eq!(engine.tree().node(deviation).unwrap().mark(), Some(NodeMark::Deviation));
    assert_eq!(engine.puzzle_progress().unwrap().state, PuzzleState::InProgress);
    assert_eq!(engine.last_result(), None);

    let outcome = engine.submit_move("e4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Correct { alternate: false }));
    assert_eq!(engine.puzzle_progress().unwrap().mistakes, 1);
}

#[test]
fn test_retry_after_deep_mistake() {
    let puzzle = Puzzle::new("deep", lines(&[&["e4", "e5", "Nf3", "Nc6", "Bb5"]]));
    let mut engine = engine_with(puzzle);

    let reply = engine.submit_move("e4").unwrap().reply.unwrap();
    engine.submit_move("Bc4").unwrap();
    assert_eq!(engine.reset_to_last_correct().unwrap(), reply);
    assert_eq!(engine.current().san(), Some("e5"));
}

#[test]
fn test_retry_without_puzzle() {
    let mut engine = Engine::new();
    assert!(matches!(engine.reset_to_last_correct(), Err(Error::NoPuzzle)));
}

#[test]
fn test_alternate_line() {
    let puzzle = Puzzle::new("two-ways", lines(&[&["e4", "e5", "Nf3"], &["d4", "d5", "c4"]]));
    let mut engine = engine_with(puzzle);

    let outcome = engine.submit_move("d4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Correct { alternate: true }));
    assert_eq!(engine.current().san(), Some("d5"));

    let outcome = engine.submit_move("c4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: true }));
}

#[test]
fn test_first_line_picks_reply() {
    let puzzle = Puzzle::new("shared", lines(&[&["e4", "e5", "Nf3"], &["e4", "c5", "Nf3"]]));
    let mut engine = engine_with(puzzle);

    engine.submit_move("e4").unwrap();
    assert_eq!(engine.current().san(), Some("e5"));

    // The second line's reply, played by hand, is not judged but keeps
    // the solver's next move on that line.
    engine.undo().unwrap();
    let outcome = engine.submit_move("c5").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(outcome.reply, None);
    assert_eq!(engine.current().san(), Some("c5"));

    let outcome = engine.submit_move("Nf3").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: true }));
}

#[test]
fn test_opponent_moves_are_not_judged() {
    let mut engine = engine_with(open_game_puzzle());
    engine.submit_move("e4").unwrap();
    engine.undo().unwrap();

    // The expected reply played by hand does not solve anything.
    let outcome = engine.submit_move("e5").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(outcome.reply, None);
    assert_eq!(engine.current().san(), Some("e5"));
    assert_eq!(engine.last_result(), None);
    assert_eq!(engine.tree().len(), 3);

    // Nor does an unexpected reply count as a mistake.
    engine.undo().unwrap();
    let outcome = engine.submit_move("c5").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(engine.current().mark(), None);
    assert_eq!(
        engine.puzzle_progress(),
        Some(PuzzleProgress {
            state: PuzzleState::InProgress,
            mistakes: 0,
            hints: 0,
        })
    );
}

#[test]
fn test_moves_after_solved_are_not_judged() {
    let mut engine = engine_with(open_game_puzzle());
    engine.submit_move("e4").unwrap();
    engine.submit_move("Nf3").unwrap();

    let outcome = engine.submit_move("Nc6").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(engine.puzzle_progress().unwrap().state, PuzzleState::Solved);
}

#[test]
fn test_without_auto_reply() {
    let mut engine = Engine::with_config(EngineConfig::default().with_auto_reply(false));
    engine.load_puzzle(open_game_puzzle()).unwrap();

    let outcome = engine.submit_move("e4").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Correct { alternate: false }));
    assert_eq!(outcome.reply, None);
    assert_eq!(engine.cursor(), outcome.node);

    let outcome = engine.submit_move("e5").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(engine.puzzle_progress().unwrap().state, PuzzleState::InProgress);
    let outcome = engine.submit_move("Nf3").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: false }));
}

#[test]
fn test_mate_in_one() {
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    let mut engine = engine_with(Puzzle::new("scholar", lines(&[&["Qxf7#"]])).with_fen(fen));

    let outcome = engine.submit_move("Qxf7").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: false }));
    assert_eq!(engine.status(), GameStatus::Checkmate);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_setup_move_for_black_solver() {
    let puzzle = Puzzle::new("as-black", lines(&[&["e4", "e5", "Nf3", "Nc6"]]))
        .with_fen(START_FEN)
        .with_player(Side::Black);
    let mut engine = engine_with(puzzle);

    assert_eq!(engine.current().san(), Some("e4"));
    assert_eq!(engine.tree().len(), 2);

    let outcome = engine.submit_move("e5").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Correct { alternate: false }));
    assert_eq!(engine.current().san(), Some("Nf3"));

    let outcome = engine.submit_move("Nc6").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: false }));
}

#[test]
fn test_load_replaces_tree() {
    let mut engine = Engine::new();
    engine.submit_move("d4").unwrap();
    engine.load_puzzle(open_game_puzzle().with_title("Open game")).unwrap();
    assert_eq!(engine.tree().len(), 1);
    assert_eq!(engine.headers().get("Event"), Some("Open game"));
    assert_eq!(engine.puzzle().unwrap().puzzle().id, "open-game");
}

#[test]
fn test_invalid_puzzle_keeps_engine() {
    let mut engine = Engine::new();
    engine.submit_move("d4").unwrap();

    let bad = Puzzle::new("bad", lines(&[&["e4", "e5", "Ke3"]]));
    match engine.load_puzzle(bad) {
        Err(Error::InvalidPuzzle { line, ply, .. }) => assert_eq!((line, ply), (0, 2)),
        other => panic!("expected InvalidPuzzle, got {:?}", other),
    }
    assert!(matches!(
        engine.load_puzzle(Puzzle::new("empty", Vec::new())),
        Err(Error::InvalidPuzzle { .. })
    ));
    assert!(matches!(
        engine.load_puzzle(open_game_puzzle().with_fen("garbage")),
        Err(Error::InvalidFen { .. })
    ));

    assert_eq!(engine.tree().len(), 2);
    assert!(engine.puzzle().is_none());
}

#[test]
fn test_clear_puzzle_keeps_tree() {
    let mut engine = engine_with(open_game_puzzle());
    engine.submit_move("e4").unwrap();
    engine.clear_puzzle();

    let outcome = engine.submit_move("Nf3").unwrap();
    assert_eq!(outcome.verdict, None);
    assert_eq!(engine.tree().len(), 4);
}

// ============================================================================
// Hints
// ============================================================================

#[test]
fn test_hint_counts() {
    let mut engine = engine_with(open_game_puzzle());
    assert_eq!(engine.puzzle_hint().unwrap().as_deref(), Some("e4"));
    assert_eq!(engine.puzzle_progress().unwrap().hints, 1);

    engine.submit_move("d4").unwrap();
    assert_eq!(engine.puzzle_hint().unwrap(), None);
    assert_eq!(engine.puzzle_progress().unwrap().hints, 1);
}

#[test]
fn test_hint_without_puzzle() {
    let mut engine = Engine::new();
    assert!(matches!(engine.puzzle_hint(), Err(Error::NoPuzzle)));
}

// ============================================================================
// Puzzle Sets
// ============================================================================

#[test]
fn test_puzzle_set_from_json() {
    let json = r#"[
        {"id": "p1", "solutions": [["e4", "e5", "Nf3"]], "player": "white", "rating": 900},
        {
            "id": "p2",
            "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            "solutions": [["c5"]]
        }
    ]"#;
    let set = PuzzleSet::from_json(json).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get("p1").unwrap().rating, Some(900));
    assert_eq!(set.get("p2").unwrap().player, None);
    assert!(set.get("p3").is_none());
    assert!(set.pick_random().is_some());

    let mut engine = Engine::new();
    engine.load_puzzle(set.get("p2").unwrap().clone()).unwrap();
    let outcome = engine.submit_move("c5").unwrap();
    assert_eq!(outcome.verdict, Some(PuzzleVerdict::Solved { alternate: false }));
}

#[test]
fn test_puzzle_set_bad_json() {
    assert!(matches!(PuzzleSet::from_json("{not json"), Err(Error::Json(_))));
    assert!(PuzzleSet::default().pick_random().is_none());
}
