//! Game record codec (PGN move text)
//!
//! This module reads and writes the text format used to import and export
//! studies:
//! - Header tags (`[Event "..."]`)
//! - Move text with move numbers, comments and annotation glyphs
//! - Nested variations in parentheses

pub mod headers;
pub mod lexer;
pub mod reader;
pub mod writer;

pub use headers::Headers;
pub use reader::{GameRecord, Line, MAX_VARIATION_DEPTH, MoveEntry, read_record};
pub use writer::{WriteOptions, write_record};
