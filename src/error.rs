//! Error types for the study engine

use thiserror::Error;

use crate::tree::NodeId;

/// Errors reported by the engine, the record codec and the puzzle loader.
///
/// Every variant is recoverable: operations that fail leave the tree and
/// the cursor exactly as they were before the call.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("illegal move '{mv}': {reason}")]
    IllegalMove { mv: String, reason: String },

    #[error("already at the root position")]
    AtRoot,

    #[error("no child at index {index} (node has {available} children)")]
    NoChildren { index: usize, available: usize },

    #[error("node {0} is not in the tree")]
    NodeNotFound(NodeId),

    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("puzzle '{id}' line {line} ply {ply}: {reason}")]
    InvalidPuzzle {
        id: String,
        line: usize,
        ply: usize,
        reason: String,
    },

    #[error("no puzzle is active")]
    NoPuzzle,

    #[error("unknown puzzle '{0}'")]
    UnknownPuzzle(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("puzzle data error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(offset: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Byte offset of a parse failure, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
