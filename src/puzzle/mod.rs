//! Puzzles: a start position plus one or more solution lines.
//!
//! Solution lines are given in SAN from the start position and include the
//! opponent's replies. The first line is the reference solution; later
//! lines are accepted alternatives.

mod set;

pub use set::PuzzleSet;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Move};

use crate::error::{Error, Result};
use crate::oracle::MoveOracle;
use crate::tree::PositionKey;

/// Side the solver plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Side {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    /// Start position, the standard initial position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    pub solutions: Vec<Vec<String>>,
    /// Solver's side, the side to move at the start when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

impl Puzzle {
    pub fn new(id: impl Into<String>, solutions: Vec<Vec<String>>) -> Self {
        Self {
            id: id.into(),
            fen: None,
            solutions,
            player: None,
            title: None,
            rating: None,
        }
    }

    pub fn with_fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    pub fn with_player(mut self, player: Side) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start_position(&self) -> Result<Chess> {
        match &self.fen {
            Some(fen) => parse_fen(fen),
            None => Ok(Chess::default()),
        }
    }

    /// Resolve every solution line against `oracle`.
    pub fn validate<O: MoveOracle>(&self, oracle: &O) -> Result<SolutionSet> {
        let invalid = |line: usize, ply: usize, reason: String| Error::InvalidPuzzle {
            id: self.id.clone(),
            line,
            ply,
            reason,
        };

        let start = self.start_position()?;
        if self.solutions.is_empty() {
            return Err(invalid(0, 0, "no solution lines".to_string()));
        }

        let mut lines = Vec::with_capacity(self.solutions.len());
        for (line_no, line) in self.solutions.iter().enumerate() {
            if line.is_empty() {
                return Err(invalid(line_no, 0, "empty solution line".to_string()));
            }
            let mut position = start.clone();
            let mut moves = Vec::with_capacity(line.len());
            let mut keys = Vec::with_capacity(line.len());
            for (ply, text) in line.iter().enumerate() {
                let mv = oracle
                    .parse_move(&position, text)
                    .map_err(|err| invalid(line_no, ply, err.to_string()))?;
                position = oracle
                    .apply_move(&position, &mv)
                    .map_err(|err| invalid(line_no, ply, err.to_string()))?;
                keys.push(oracle.position_key(&position));
                moves.push(mv);
            }
            lines.push(SolutionLine { moves, keys });
        }

        Ok(SolutionSet { lines })
    }
}

pub(crate) fn parse_fen(fen: &str) -> Result<Chess> {
    let invalid = |reason: String| Error::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.trim().parse().map_err(|err| invalid(format!("{}", err)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|err| invalid(format!("{}", err)))
}

/// One validated solution line.
#[derive(Clone, Debug)]
pub struct SolutionLine {
    moves: Vec<Move>,
    /// Key of the position after each move.
    keys: Vec<PositionKey>,
}

impl SolutionLine {
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn follows(&self, path: &[PositionKey]) -> bool {
        path.len() <= self.keys.len() && self.keys[..path.len()] == *path
    }
}

#[derive(Clone, Debug)]
pub struct SolutionSet {
    lines: Vec<SolutionLine>,
}

impl SolutionSet {
    pub fn lines(&self) -> &[SolutionLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&SolutionLine> {
        self.lines.get(index)
    }

    /// Lines that pass through every position of `path`, in registration
    /// order. `path` holds the keys of the positions after each move.
    pub fn live_lines(&self, path: &[PositionKey]) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.follows(path))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Result of evaluating a move in puzzle mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleVerdict {
    /// On a solution line that continues. `alternate` is set when the
    /// first registered line no longer matches.
    Correct { alternate: bool },
    /// The move completed a solution line.
    Solved { alternate: bool },
    /// The move left every solution line.
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleState {
    InProgress,
    Failed,
    Solved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleProgress {
    pub state: PuzzleState,
    pub mistakes: u32,
    pub hints: u32,
}

/// A puzzle being solved against the engine's tree.
#[derive(Clone, Debug)]
pub struct PuzzleSession {
    pub(crate) puzzle: Puzzle,
    pub(crate) solutions: SolutionSet,
    pub(crate) player: Color,
    pub(crate) state: PuzzleState,
    pub(crate) mistakes: u32,
    pub(crate) hints: u32,
}

impl PuzzleSession {
    pub(crate) fn new(puzzle: Puzzle, solutions: SolutionSet, player: Color) -> Self {
        Self {
            puzzle,
            solutions,
            player,
            state: PuzzleState::InProgress,
            mistakes: 0,
            hints: 0,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn solutions(&self) -> &SolutionSet {
        &self.solutions
    }

    pub fn player(&self) -> Color {
        self.player
    }

    pub fn progress(&self) -> PuzzleProgress {
        PuzzleProgress {
            state: self.state,
            mistakes: self.mistakes,
            hints: self.hints,
        }
    }
}
