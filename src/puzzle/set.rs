//! Puzzle collections loaded from JSON.

use std::fs;
use std::path::Path;

use tracing::info;

use super::Puzzle;
use crate::error::{Error, Result};

/// An ordered collection of puzzles, looked up by id.
#[derive(Clone, Debug, Default)]
pub struct PuzzleSet {
    puzzles: Vec<Puzzle>,
}

impl PuzzleSet {
    /// Parse a JSON array of puzzles.
    pub fn from_json(text: &str) -> Result<Self> {
        let puzzles: Vec<Puzzle> = serde_json::from_str(text)?;
        Ok(Self { puzzles })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| Error::io(format!("read puzzles from {}", path.display()), err))?;
        let set = Self::from_json(&text)?;
        info!(path = %path.display(), count = set.len(), "loaded puzzles");
        Ok(set)
    }

    pub fn push(&mut self, puzzle: Puzzle) {
        self.puzzles.push(puzzle);
    }

    pub fn get(&self, id: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == id)
    }

    /// A uniformly chosen puzzle, `None` when the set is empty.
    pub fn pick_random(&self) -> Option<&Puzzle> {
        if self.puzzles.is_empty() {
            return None;
        }
        let index = (rand::random::<u64>() % self.puzzles.len() as u64) as usize;
        self.puzzles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}
