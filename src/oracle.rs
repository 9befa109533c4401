//! Move oracle: legality, move application and game status.
//!
//! The engine never decides chess rules on its own. Everything that needs
//! rules knowledge goes through a [`MoveOracle`], and [`StandardRules`]
//! provides standard chess through `shakmaty`.

use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::{Error, Result};
use crate::tree::PositionKey;

/// Terminal state of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Checkmate,
    Stalemate,
    Draw,
    Ongoing,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

pub trait MoveOracle {
    /// Resolve move text (SAN or UCI) to a legal move in `position`.
    fn parse_move(&self, position: &Chess, text: &str) -> Result<Move>;

    fn apply_move(&self, position: &Chess, mv: &Move) -> Result<Chess>;

    fn legal_moves(&self, position: &Chess) -> Vec<Move>;

    fn status(&self, position: &Chess) -> GameStatus;

    fn position_key(&self, position: &Chess) -> PositionKey;

    /// SAN of `mv` in `position`, with check and mate suffixes.
    fn san(&self, position: &Chess, mv: &Move) -> String;
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRules;

impl MoveOracle for StandardRules {
    fn parse_move(&self, position: &Chess, text: &str) -> Result<Move> {
        let text = text.trim();
        let illegal = |reason: &str| Error::IllegalMove {
            mv: text.to_string(),
            reason: reason.to_string(),
        };
        if text.is_empty() {
            return Err(illegal("empty move"));
        }

        let san_error = match text.parse::<SanPlus>() {
            Ok(san) => match san.san.to_move(position) {
                Ok(mv) => return Ok(mv),
                Err(err) => Some(err.to_string()),
            },
            Err(_) => None,
        };

        // Coordinate notation such as g1f3 can also parse as SAN, so only
        // report the SAN error once UCI has been tried as well.
        let uci: UciMove = text.parse().map_err(|_| match &san_error {
            Some(reason) => illegal(reason),
            None => illegal("not SAN or UCI notation"),
        })?;
        let mv = uci
            .to_move(position)
            .map_err(|err| illegal(&err.to_string()))?;
        if position.is_legal(&mv) {
            Ok(mv)
        } else {
            Err(illegal("not legal in this position"))
        }
    }

    fn apply_move(&self, position: &Chess, mv: &Move) -> Result<Chess> {
        position.clone().play(mv).map_err(|_| Error::IllegalMove {
            mv: mv.to_uci(CastlingMode::Standard).to_string(),
            reason: "not legal in this position".to_string(),
        })
    }

    fn legal_moves(&self, position: &Chess) -> Vec<Move> {
        position.legal_moves().into_iter().collect()
    }

    fn status(&self, position: &Chess) -> GameStatus {
        if position.is_checkmate() {
            GameStatus::Checkmate
        } else if position.is_stalemate() {
            GameStatus::Stalemate
        } else if position.is_insufficient_material() || position.halfmoves() >= 150 {
            GameStatus::Draw
        } else {
            GameStatus::Ongoing
        }
    }

    fn position_key(&self, position: &Chess) -> PositionKey {
        let z: Zobrist64 = position.zobrist_hash(EnPassantMode::Legal);
        PositionKey(z.0)
    }

    fn san(&self, position: &Chess, mv: &Move) -> String {
        SanPlus::from_move(position.clone(), mv).to_string()
    }
}

