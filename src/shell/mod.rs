//! Study shell
//!
//! A line-oriented command protocol over the engine, used by the `trainer`
//! binary and by tests. Each line is one command; errors are reported and
//! the loop carries on.

pub mod protocol;

pub use protocol::{Flow, Shell};
