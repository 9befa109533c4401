//! Variation Tree Tests
//!
//! Move submission, navigation and line promotion through the engine.

use study_tree::{Engine, Error, GameStatus, NodeId};

fn play(engine: &mut Engine, moves: &[&str]) -> NodeId {
    let mut last = engine.cursor();
    for mv in moves {
        last = engine.submit_move(mv).unwrap().node;
    }
    last
}

// ============================================================================
// Move Submission
// ============================================================================

#[test]
fn test_new_engine_has_only_root() {
    let engine = Engine::new();
    assert_eq!(engine.tree().len(), 1);
    assert_eq!(engine.cursor(), engine.tree().root());
    assert_eq!(engine.current().ply(), 0);
    assert!(engine.current().mv().is_none());
}

#[test]
fn test_submit_appends_and_advances() {
    let mut engine = Engine::new();
    let outcome = engine.submit_move("e4").unwrap();
    assert!(outcome.created);
    assert_eq!(outcome.verdict, None);
    assert_eq!(engine.cursor(), outcome.node);
    assert_eq!(engine.current().san(), Some("e4"));
    assert_eq!(engine.current().ply(), 1);
    assert_eq!(
        engine.current().fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
    );
}

#[test]
fn test_same_move_merges_into_existing_child() {
    let mut engine = Engine::new();
    let first = engine.submit_move("e4").unwrap();
    engine.undo().unwrap();
    let second = engine.submit_move("e4").unwrap();
    assert_eq!(first.node, second.node);
    assert!(!second.created);
    assert_eq!(engine.tree().len(), 2);
}

#[test]
fn test_uci_and_san_reach_same_child() {
    let mut engine = Engine::new();
    let san = engine.submit_move("Nf3").unwrap();
    engine.undo().unwrap();
    let uci = engine.submit_move("g1f3").unwrap();
    assert_eq!(san.node, uci.node);
    assert_eq!(engine.tree().len(), 2);
}

#[test]
fn test_illegal_move_leaves_tree_unchanged() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    let cursor = engine.cursor();

    assert!(matches!(engine.submit_move("e4"), Err(Error::IllegalMove { .. })));
    assert!(matches!(engine.submit_move("Ke3"), Err(Error::IllegalMove { .. })));
    assert!(matches!(engine.submit_move("nonsense"), Err(Error::IllegalMove { .. })));
    assert!(matches!(engine.submit_move(""), Err(Error::IllegalMove { .. })));

    assert_eq!(engine.cursor(), cursor);
    assert_eq!(engine.tree().len(), 2);
}

#[test]
fn test_check_suffix_in_san() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4", "f5"]);
    let node = engine.submit_move("Qh5").unwrap().node;
    assert_eq!(engine.tree().node(node).unwrap().san(), Some("Qh5+"));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_undo_at_root() {
    let mut engine = Engine::new();
    assert!(matches!(engine.undo(), Err(Error::AtRoot)));
}

#[test]
fn test_undo_keeps_nodes() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4", "e5", "Nf3"]);
    engine.undo().unwrap();
    engine.undo().unwrap();
    assert_eq!(engine.tree().len(), 4);
    assert_eq!(engine.current().san(), Some("e4"));
}

#[test]
fn test_redo_follows_main_line() {
    let mut engine = Engine::new();
    let e4 = play(&mut engine, &["e4"]);
    engine.undo().unwrap();
    play(&mut engine, &["d4"]);
    engine.undo().unwrap();

    assert_eq!(engine.redo().unwrap(), e4);
}

#[test]
fn test_advance_into_side_line() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    engine.undo().unwrap();
    let d4 = play(&mut engine, &["d4"]);
    engine.undo().unwrap();

    assert_eq!(engine.advance(Some(1)).unwrap(), d4);
}

#[test]
fn test_redo_at_leaf() {
    let mut engine = Engine::new();
    match engine.redo() {
        Err(Error::NoChildren { index, available }) => assert_eq!((index, available), (0, 0)),
        other => panic!("expected NoChildren, got {:?}", other),
    }
    play(&mut engine, &["e4"]);
    engine.undo().unwrap();
    match engine.advance(Some(1)) {
        Err(Error::NoChildren { index, available }) => assert_eq!((index, available), (1, 1)),
        other => panic!("expected NoChildren, got {:?}", other),
    }
}

#[test]
fn test_jump_to_any_node() {
    let mut engine = Engine::new();
    let e5 = play(&mut engine, &["e4", "e5"]);
    engine.jump_to(engine.tree().root()).unwrap();
    let c5 = play(&mut engine, &["e4", "c5"]);

    assert_eq!(engine.jump_to(e5).unwrap(), e5);
    assert_eq!(engine.cursor(), e5);
    assert_eq!(engine.jump_to(c5).unwrap(), c5);
}

#[test]
fn test_jump_to_missing_node() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    let cursor = engine.cursor();
    assert!(matches!(engine.jump_to(NodeId::new(99)), Err(Error::NodeNotFound(_))));
    assert_eq!(engine.cursor(), cursor);
}

// ============================================================================
// Line Promotion
// ============================================================================

#[test]
fn test_promote_side_line() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4", "e5", "Nf3"]);
    engine.jump_to(engine.tree().root()).unwrap();
    let c5 = play(&mut engine, &["e4", "c5"]);
    let d3 = play(&mut engine, &["d3"]);

    let parents: Vec<_> = engine.tree().iter().map(|n| n.parent()).collect();
    let len = engine.tree().len();

    assert_eq!(engine.tree().main_line_san(), vec!["e4", "e5", "Nf3"]);
    engine.promote_line(d3).unwrap();
    assert_eq!(engine.tree().main_line_san(), vec!["e4", "c5", "d3"]);

    let after: Vec<_> = engine.tree().iter().map(|n| n.parent()).collect();
    assert_eq!(parents, after);
    assert_eq!(engine.tree().len(), len);
    assert_eq!(engine.tree().node(c5).unwrap().children(), &[d3]);
}

#[test]
fn test_promote_missing_node() {
    let mut engine = Engine::new();
    assert!(matches!(engine.promote_line(NodeId::new(5)), Err(Error::NodeNotFound(_))));
}

// ============================================================================
// Tree Queries
// ============================================================================

#[test]
fn test_path_and_current_line() {
    let mut engine = Engine::new();
    let nf3 = play(&mut engine, &["e4", "e5", "Nf3"]);
    engine.undo().unwrap();
    engine.undo().unwrap();

    let path = engine.tree().path_to(nf3).unwrap();
    assert_eq!(path.len(), 4);
    assert_eq!(path[0], engine.tree().root());
    assert_eq!(*path.last().unwrap(), nf3);

    assert_eq!(engine.tree().current_line(), path);
}

#[test]
fn test_move_labels() {
    let mut engine = Engine::new();
    let e5 = play(&mut engine, &["e4", "e5"]);
    let tree = engine.tree();
    let node = tree.node(e5).unwrap();
    let parent = tree.node(node.parent().unwrap()).unwrap();
    assert_eq!(node.label(parent), "1... e5");
}

#[test]
fn test_comments_and_nags() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    engine.set_comment(Some("best by test".to_string())).unwrap();
    engine.add_nag(1).unwrap();
    engine.add_nag(1).unwrap();
    assert_eq!(engine.current().comment(), Some("best by test"));
    assert_eq!(engine.current().nags(), &[1]);

    engine.set_comment(None).unwrap();
    assert_eq!(engine.current().comment(), None);
}

#[test]
fn test_legal_moves_at_start() {
    let engine = Engine::new();
    assert_eq!(engine.legal_moves().len(), 20);
}

#[test]
fn test_status_checkmate() {
    let mut engine = Engine::new();
    assert_eq!(engine.status(), GameStatus::Ongoing);
    play(&mut engine, &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
    assert_eq!(engine.status(), GameStatus::Checkmate);
    assert!(engine.legal_moves().is_empty());
}

#[test]
fn test_status_stalemate() {
    let mut engine = Engine::new();
    engine.reset(Some("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")).unwrap();
    assert_eq!(engine.status(), GameStatus::Stalemate);
}

#[test]
fn test_reset_from_fen() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    engine.reset(Some("8/8/8/4k3/8/8/4K3/4Q3 w - - 0 1")).unwrap();
    assert_eq!(engine.tree().len(), 1);
    assert_eq!(engine.current().fen(), "8/8/8/4k3/8/8/4K3/4Q3 w - - 0 1");
}

#[test]
fn test_reset_bad_fen_keeps_tree() {
    let mut engine = Engine::new();
    play(&mut engine, &["e4"]);
    assert!(matches!(engine.reset(Some("not a fen")), Err(Error::InvalidFen { .. })));
    assert_eq!(engine.tree().len(), 2);
    assert_eq!(engine.current().san(), Some("e4"));
}
