//! Tree nodes and identifiers.

use std::fmt;
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Move, Position};

/// Index of a node in the tree arena. Stable until the tree is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

/// Zobrist key of a position (board, side to move, castling, en passant).
///
/// Move counters are not part of the key, so two move orders reaching the
/// same position share a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey(pub u64);

/// Puzzle overlay flag on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeMark {
    /// On a solution line.
    Solution,
    /// Reached by a move that left every solution line.
    Deviation,
}

#[derive(Clone, Debug)]
pub struct PositionNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) position: Chess,
    pub(crate) key: PositionKey,
    pub(crate) mv: Option<Move>,
    pub(crate) san: Option<String>,
    pub(crate) ply: u32,
    pub(crate) comment: Option<String>,
    pub(crate) nags: Vec<u8>,
    pub(crate) mark: Option<NodeMark>,
}

impl PositionNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in exploration order; the first one is the main line.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn key(&self) -> PositionKey {
        self.key
    }

    /// Canonical FEN of the position.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// The move that produced this node, `None` at the root.
    pub fn mv(&self) -> Option<&Move> {
        self.mv.as_ref()
    }

    pub fn san(&self) -> Option<&str> {
        self.san.as_deref()
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn nags(&self) -> &[u8] {
        &self.nags
    }

    pub fn mark(&self) -> Option<NodeMark> {
        self.mark
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Move label as shown in a move list, e.g. `3. Nf3` or `3... Nc6`.
    pub fn label(&self, parent: &PositionNode) -> String {
        let san = self.san.as_deref().unwrap_or("");
        let number = parent.position.fullmoves();
        if parent.position.turn().is_white() {
            format!("{}. {}", number, san)
        } else {
            format!("{}... {}", number, san)
        }
    }
}
