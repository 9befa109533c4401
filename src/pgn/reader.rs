//! Record reader: tokens to a game record with nested variations.
//!
//! Moves are kept as text here. Resolving them against positions happens
//! when the record is grafted onto a tree, where an illegal move is
//! reported at its own offset.

use super::headers::Headers;
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::{Error, Result};

/// Deepest variation nesting accepted in move text.
pub const MAX_VARIATION_DEPTH: usize = 128;

/// One move of a line, with the alternatives that could replace it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveEntry {
    pub san: String,
    pub offset: usize,
    pub nags: Vec<u8>,
    pub comment: Option<String>,
    pub variations: Vec<Line>,
}

/// A sequence of moves, optionally opened by a comment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub comment: Option<String>,
    pub moves: Vec<MoveEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub headers: Headers,
    /// Byte offset of each header tag, in reading order.
    pub header_offsets: Vec<(String, usize)>,
    pub line: Line,
    pub result: Option<String>,
}

impl GameRecord {
    /// Offset of the tag that set `key`. A repeated tag reports its last
    /// occurrence, the one whose value was kept.
    pub fn header_offset(&self, key: &str) -> Option<usize> {
        self.header_offsets
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|&(_, offset)| offset)
    }
}

/// Parse the first game in `text`. Any later games are ignored.
pub fn read_record(text: &str) -> Result<GameRecord> {
    let tokens = tokenize(text)?;
    let mut reader = Reader { tokens: &tokens, at: 0 };
    let mut record = GameRecord::default();

    while let Some(token) = reader.peek() {
        match &token.kind {
            TokenKind::Header { key, value } => {
                record.headers.set(*key, value.clone());
                record.header_offsets.push((key.to_string(), token.offset));
                reader.at += 1;
            }
            _ => break,
        }
    }

    let (line, result) = reader.line(None, 0)?;
    record.line = line;
    record.result = result.map(str::to_string);

    if let Some(token) = reader.peek() {
        if !matches!(token.kind, TokenKind::Header { .. }) {
            return Err(Error::parse(token.offset, "unexpected token after result"));
        }
    }

    Ok(record)
}

struct Reader<'t, 'a> {
    tokens: &'t [Token<'a>],
    at: usize,
}

impl<'t, 'a> Reader<'t, 'a> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.at)
    }

    /// Read moves until the end of input, a result, or the `)` closing the
    /// variation opened at `open`, `depth` levels below the main line.
    fn line(&mut self, open: Option<usize>, depth: usize) -> Result<(Line, Option<&'a str>)> {
        let mut line = Line::default();

        while let Some(token) = self.peek() {
            self.at += 1;
            match &token.kind {
                TokenKind::MoveNumber(_) => {}
                TokenKind::San { text, nags } => {
                    line.moves.push(MoveEntry {
                        san: text.replace('0', "O"),
                        offset: token.offset,
                        nags: nags.clone(),
                        ..MoveEntry::default()
                    });
                }
                TokenKind::Nag(nag) => match line.moves.last_mut() {
                    Some(entry) => entry.nags.push(*nag),
                    None => return Err(Error::parse(token.offset, "annotation before any move")),
                },
                TokenKind::Comment(text) => {
                    let slot = match line.moves.last_mut() {
                        Some(entry) => &mut entry.comment,
                        None => &mut line.comment,
                    };
                    append(slot, text);
                }
                TokenKind::Open => {
                    if line.moves.is_empty() {
                        return Err(Error::parse(token.offset, "variation before any move"));
                    }
                    if depth >= MAX_VARIATION_DEPTH {
                        return Err(Error::parse(token.offset, "variations nested too deeply"));
                    }
                    let (variation, _) = self.line(Some(token.offset), depth + 1)?;
                    if let Some(entry) = line.moves.last_mut() {
                        entry.variations.push(variation);
                    }
                }
                TokenKind::Close => {
                    return match open {
                        Some(_) => Ok((line, None)),
                        None => Err(Error::parse(token.offset, "unmatched ')'")),
                    };
                }
                TokenKind::Result(result) => {
                    if open.is_some() {
                        return Err(Error::parse(token.offset, "result inside a variation"));
                    }
                    return Ok((line, Some(*result)));
                }
                TokenKind::Header { .. } => {
                    return Err(Error::parse(token.offset, "header inside move text"));
                }
            }
        }

        match open {
            Some(offset) => Err(Error::parse(offset, "unterminated variation")),
            None => Ok((line, None)),
        }
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}
