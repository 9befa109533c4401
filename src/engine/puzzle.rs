//! Puzzle mode on top of the tree.
//!
//! Evaluation is derived from the path between the root and the node being
//! judged, so undo and jumps need no extra bookkeeping: a node is correct
//! when its path is a prefix of at least one solution line.

use shakmaty::{Color, Position};
use tracing::info;

use super::{Engine, MoveOutcome, extend, fresh_tree};
use crate::error::{Error, Result};
use crate::oracle::MoveOracle;
use crate::pgn::Headers;
use crate::puzzle::{Puzzle, PuzzleProgress, PuzzleSession, PuzzleState, PuzzleVerdict};
use crate::tree::{NodeId, NodeMark, PositionKey};

impl<O: MoveOracle> Engine<O> {
    /// Reset the tree to the puzzle's start and arm evaluation. When the
    /// side to move is not the solver's side, the first solution move is
    /// played as the setup move.
    pub fn load_puzzle(&mut self, puzzle: Puzzle) -> Result<()> {
        let solutions = puzzle.validate(&self.oracle)?;
        let start = puzzle.start_position()?;
        let player: Color = puzzle.player.map(Into::into).unwrap_or(start.turn());

        let mut tree = fresh_tree(&self.oracle, start.clone());
        if start.turn() != player {
            let setup = solutions
                .line(0)
                .and_then(|line| line.moves().first())
                .ok_or(Error::NoPuzzle)?;
            let root = tree.root();
            let (node, _) = extend(&self.oracle, &mut tree, root, &start, setup)?;
            tree.set_mark(node, Some(NodeMark::Solution))?;
            tree.jump_to(node)?;
        }

        let mut headers = Headers::new();
        headers.set("Event", puzzle.title.clone().unwrap_or_else(|| puzzle.id.clone()));
        if let Some(fen) = &puzzle.fen {
            headers.set("SetUp", "1");
            headers.set("FEN", fen.trim());
        }

        info!(puzzle = %puzzle.id, lines = solutions.lines().len(), "puzzle loaded");
        self.tree = tree;
        self.headers = headers;
        self.puzzle = Some(PuzzleSession::new(puzzle, solutions, player));
        self.last_result = None;
        Ok(())
    }

    pub fn puzzle(&self) -> Option<&PuzzleSession> {
        self.puzzle.as_ref()
    }

    /// Leave puzzle mode, keeping the tree for free exploration.
    pub fn clear_puzzle(&mut self) {
        self.puzzle = None;
        self.last_result = None;
    }

    pub fn puzzle_progress(&self) -> Option<PuzzleProgress> {
        self.puzzle.as_ref().map(PuzzleSession::progress)
    }

    /// Move the cursor back to the deepest node of its path that is still
    /// on a solution line. The deviation stays in the tree.
    pub fn reset_to_last_correct(&mut self) -> Result<NodeId> {
        let session = self.puzzle.as_ref().ok_or(Error::NoPuzzle)?;
        let path = self.tree.path_to(self.tree.cursor())?;
        let keys = self.path_keys(&path);

        let depth = (0..=keys.len())
            .rev()
            .find(|&d| !session.solutions.live_lines(&keys[..d]).is_empty())
            .unwrap_or(0);
        let target = path[depth];

        self.tree.jump_to(target)?;
        if let Some(session) = self.puzzle.as_mut() {
            if session.state == PuzzleState::Failed {
                session.state = PuzzleState::InProgress;
            }
        }
        self.last_result = None;
        Ok(target)
    }

    /// Next expected move at the cursor, in SAN. `None` when the cursor is
    /// off every solution line or at the end of one.
    pub fn puzzle_hint(&mut self) -> Result<Option<String>> {
        let session = self.puzzle.as_ref().ok_or(Error::NoPuzzle)?;
        let path = self.tree.path_to(self.tree.cursor())?;
        let keys = self.path_keys(&path);
        let depth = keys.len();

        let next = session
            .solutions
            .live_lines(&keys)
            .into_iter()
            .filter_map(|i| session.solutions.line(i))
            .find_map(|line| line.moves().get(depth).cloned());
        let Some(mv) = next else {
            return Ok(None);
        };

        let san = self.oracle.san(self.tree.current().position(), &mv);
        if let Some(session) = self.puzzle.as_mut() {
            session.hints += 1;
        }
        Ok(Some(san))
    }

    /// Judge the node reached by a submitted move and, when it is correct,
    /// play the opponent's reply from the first matching line. Moves made
    /// for the opponent get no verdict.
    pub(super) fn evaluate_puzzle_move(&mut self, outcome: &mut MoveOutcome) -> Result<()> {
        let Some(session) = self.puzzle.as_ref() else {
            return Ok(());
        };
        if session.state == PuzzleState::Solved {
            return Ok(());
        }

        let node = outcome.node;
        let Some(parent) = self.tree.node(node)?.parent() else {
            return Ok(());
        };
        // Only the solver's moves are judged.
        if self.tree.node(parent)?.position().turn() != session.player {
            return Ok(());
        }

        let path = self.tree.path_to(node)?;
        let keys = self.path_keys(&path);
        let depth = keys.len();
        let live = session.solutions.live_lines(&keys);

        let Some(&first) = live.first() else {
            if self.tree.node(node)?.mark() != Some(NodeMark::Solution) {
                self.tree.set_mark(node, Some(NodeMark::Deviation))?;
            }
            if let Some(session) = self.puzzle.as_mut() {
                session.state = PuzzleState::Failed;
                session.mistakes += 1;
            }
            outcome.verdict = Some(PuzzleVerdict::Incorrect);
            info!(node = %node, "puzzle move incorrect");
            return Ok(());
        };

        let lines = session.solutions.lines();
        let finished = live.iter().copied().find(|&i| lines[i].len() == depth);
        let reply = match finished {
            Some(_) => None,
            None => lines[first].moves().get(depth).cloned(),
        };
        let reply_ends_line = lines[first].len() == depth + 1;
        self.tree.set_mark(node, Some(NodeMark::Solution))?;

        let verdict = if let Some(line) = finished {
            PuzzleVerdict::Solved { alternate: line != 0 }
        } else if let (true, Some(reply)) = (self.config.auto_reply, reply) {
            let position = self.tree.node(node)?.position().clone();
            let (reply_node, _) = extend(&self.oracle, &mut self.tree, node, &position, &reply)?;
            self.tree.set_mark(reply_node, Some(NodeMark::Solution))?;
            self.tree.jump_to(reply_node)?;
            outcome.reply = Some(reply_node);
            if reply_ends_line {
                PuzzleVerdict::Solved { alternate: first != 0 }
            } else {
                PuzzleVerdict::Correct { alternate: first != 0 }
            }
        } else {
            PuzzleVerdict::Correct { alternate: first != 0 }
        };

        if let Some(session) = self.puzzle.as_mut() {
            session.state = match verdict {
                PuzzleVerdict::Solved { .. } => PuzzleState::Solved,
                _ => PuzzleState::InProgress,
            };
        }
        outcome.verdict = Some(verdict);
        info!(node = %node, ?verdict, "puzzle move evaluated");
        Ok(())
    }

    /// Keys of the positions after each move of `path` (root excluded).
    fn path_keys(&self, path: &[NodeId]) -> Vec<PositionKey> {
        path.iter()
            .skip(1)
            .filter_map(|&id| self.tree.get(id))
            .map(|node| node.key())
            .collect()
    }
}
