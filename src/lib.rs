pub mod engine;
pub mod error;
pub mod oracle;
pub mod pgn;
pub mod puzzle;
pub mod shell;
pub mod tree;

pub use engine::{Engine, EngineConfig, ImportMode, MoveOutcome};
pub use error::{Error, Result};
pub use oracle::{GameStatus, MoveOracle, StandardRules};
pub use puzzle::{Puzzle, PuzzleSet, PuzzleState, PuzzleVerdict, Side};
pub use shakmaty;
pub use shell::Shell;
pub use tree::{NodeId, NodeMark, PositionNode, VariationTree};
