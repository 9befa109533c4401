//! Study engine
//!
//! This module ties the pieces together:
//! - The variation tree and its cursor
//! - Move submission through the move oracle
//! - Record import and export
//! - Puzzle evaluation on top of the tree
//!
//! Operations either succeed completely or leave the engine untouched.

pub mod config;
mod import;
mod puzzle;

pub use config::{EngineConfig, ImportMode};

use shakmaty::{Chess, Move};
use tracing::debug;

use crate::error::Result;
use crate::oracle::{GameStatus, MoveOracle, StandardRules};
use crate::pgn::{Headers, write_record};
use crate::puzzle::{PuzzleSession, PuzzleVerdict, parse_fen};
use crate::tree::{NewNode, NodeId, PositionNode, VariationTree};

/// What a successful [`Engine::submit_move`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Node reached by the submitted move.
    pub node: NodeId,
    /// False when an existing child was reused.
    pub created: bool,
    /// Puzzle evaluation, when a puzzle is active.
    pub verdict: Option<PuzzleVerdict>,
    /// Opponent reply played automatically after a correct move.
    pub reply: Option<NodeId>,
}

pub struct Engine<O: MoveOracle = StandardRules> {
    oracle: O,
    tree: VariationTree,
    headers: Headers,
    config: EngineConfig,
    puzzle: Option<PuzzleSession>,
    last_result: Option<PuzzleVerdict>,
}

impl Engine<StandardRules> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_oracle(StandardRules, config)
    }
}

impl Default for Engine<StandardRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: MoveOracle> Engine<O> {
    pub fn with_oracle(oracle: O, config: EngineConfig) -> Self {
        let tree = fresh_tree(&oracle, Chess::default());
        Engine {
            oracle,
            tree,
            headers: Headers::new(),
            config,
            puzzle: None,
            last_result: None,
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn tree(&self) -> &VariationTree {
        &self.tree
    }

    pub fn cursor(&self) -> NodeId {
        self.tree.cursor()
    }

    /// Node under the cursor.
    pub fn current(&self) -> &PositionNode {
        self.tree.current()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Verdict of the most recent puzzle move, cleared by navigation.
    pub fn last_result(&self) -> Option<PuzzleVerdict> {
        self.last_result
    }

    /// Start over from `fen`, or from the standard position. Drops the
    /// current tree, headers and puzzle.
    pub fn reset(&mut self, fen: Option<&str>) -> Result<()> {
        let start = match fen {
            Some(fen) => parse_fen(fen)?,
            None => Chess::default(),
        };
        self.tree = fresh_tree(&self.oracle, start);
        self.headers = Headers::new();
        if let Some(fen) = fen {
            self.headers.set("SetUp", "1");
            self.headers.set("FEN", self.tree.root_node().fen());
            debug!(fen, "reset");
        }
        self.puzzle = None;
        self.last_result = None;
        Ok(())
    }

    /// Play `text` from the cursor. Reuses an existing child that reaches
    /// the same position, otherwise appends a new one.
    pub fn submit_move(&mut self, text: &str) -> Result<MoveOutcome> {
        let parent = self.tree.cursor();
        let position = self.tree.current().position().clone();
        let mv = self.oracle.parse_move(&position, text)?;
        let (node, created) = extend(&self.oracle, &mut self.tree, parent, &position, &mv)?;
        self.tree.jump_to(node)?;
        debug!(node = %node, created, mv = text, "move");

        let mut outcome = MoveOutcome {
            node,
            created,
            verdict: None,
            reply: None,
        };
        if self.puzzle.is_some() {
            self.evaluate_puzzle_move(&mut outcome)?;
            self.last_result = outcome.verdict;
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<NodeId> {
        self.last_result = None;
        self.tree.undo()
    }

    /// Follow the main line one move.
    pub fn redo(&mut self) -> Result<NodeId> {
        self.advance(None)
    }

    pub fn advance(&mut self, index: Option<usize>) -> Result<NodeId> {
        let node = self.tree.advance(index)?;
        self.last_result = None;
        Ok(node)
    }

    pub fn jump_to(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.tree.jump_to(id)?;
        self.last_result = None;
        Ok(node)
    }

    pub fn promote_line(&mut self, id: NodeId) -> Result<()> {
        self.tree.promote_line(id)
    }

    pub fn set_comment(&mut self, comment: Option<String>) -> Result<()> {
        self.tree.set_comment(self.tree.cursor(), comment)
    }

    pub fn add_nag(&mut self, nag: u8) -> Result<()> {
        self.tree.add_nag(self.tree.cursor(), nag)
    }

    /// Legal moves at the cursor, in SAN.
    pub fn legal_moves(&self) -> Vec<String> {
        let position = self.tree.current().position();
        self.oracle
            .legal_moves(position)
            .iter()
            .map(|mv| self.oracle.san(position, mv))
            .collect()
    }

    pub fn status(&self) -> GameStatus {
        self.oracle.status(self.tree.current().position())
    }

    /// Serialize headers and tree. Side lines and comments follow the
    /// export options in the config.
    pub fn export_record(&self) -> String {
        let mut headers = self.headers.clone();
        let root = self.tree.root_node();
        if root.key() != self.oracle.position_key(&Chess::default()) {
            headers.set("SetUp", "1");
            headers.set("FEN", root.fen());
        }
        write_record(&self.tree, &headers, self.config.write_options())
    }
}

fn fresh_tree<O: MoveOracle>(oracle: &O, start: Chess) -> VariationTree {
    let key = oracle.position_key(&start);
    VariationTree::new(start, key)
}

/// Apply `mv` at `parent` (whose position is `position`) and attach the
/// result, merging with an existing child.
fn extend<O: MoveOracle>(
    oracle: &O,
    tree: &mut VariationTree,
    parent: NodeId,
    position: &Chess,
    mv: &Move,
) -> Result<(NodeId, bool)> {
    let next = oracle.apply_move(position, mv)?;
    let key = oracle.position_key(&next);
    let san = oracle.san(position, mv);
    tree.insert_child(
        parent,
        NewNode {
            position: next,
            key,
            mv: mv.clone(),
            san,
        },
    )
}
