//! PGN tokenizer with byte offsets.

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Header { key: &'a str, value: String },
    MoveNumber(u32),
    /// SAN text with any `!`/`?` suffix already split off into `nags`.
    San { text: &'a str, nags: Vec<u8> },
    Nag(u8),
    Comment(&'a str),
    Open,
    Close,
    Result(&'a str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'{' | b'}' | b'[' | b']')
}

/// NAG number for a move suffix such as `!?`.
fn suffix_nag(suffix: &str) -> Option<u8> {
    match suffix {
        "!" => Some(1),
        "?" => Some(2),
        "!!" => Some(3),
        "??" => Some(4),
        "!?" => Some(5),
        "?!" => Some(6),
        _ => None,
    }
}

/// Tokenize a whole record.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        match b {
            b'[' => {
                let (kind, end) = header(text, start)?;
                tokens.push(Token { kind, offset: start });
                i = end;
            }
            b'{' => {
                let close = text[start + 1..]
                    .find('}')
                    .ok_or_else(|| Error::parse(start, "unterminated comment"))?;
                let body = &text[start + 1..start + 1 + close];
                tokens.push(Token {
                    kind: TokenKind::Comment(body.trim()),
                    offset: start,
                });
                i = start + close + 2;
            }
            b'(' => {
                tokens.push(Token { kind: TokenKind::Open, offset: start });
                i += 1;
            }
            b')' => {
                tokens.push(Token { kind: TokenKind::Close, offset: start });
                i += 1;
            }
            b'}' | b']' => {
                return Err(Error::parse(start, format!("unexpected '{}'", b as char)));
            }
            _ => {
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                word(&text[start..i], start, &mut tokens)?;
            }
        }
    }

    Ok(tokens)
}

/// Parse `[Key "Value"]` starting at `start`; returns the token and the
/// offset just past the closing bracket.
fn header(text: &str, start: usize) -> Result<(TokenKind<'_>, usize)> {
    let bytes = text.as_bytes();
    let malformed = || Error::parse(start, "malformed header");

    let mut i = start + 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let key_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i == key_start {
        return Err(malformed());
    }
    let key = &text[key_start..i];

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b'"') {
        return Err(malformed());
    }
    i += 1;

    let mut value = String::new();
    let mut closed = false;
    let mut chars = text[i..].char_indices();
    while let Some((at, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            '"' => {
                i += at + 1;
                closed = true;
                break;
            }
            _ => value.push(c),
        }
    }
    if !closed {
        return Err(Error::parse(start, "unterminated header value"));
    }

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b']') {
        return Err(malformed());
    }

    Ok((TokenKind::Header { key, value }, i + 1))
}

/// Classify a whitespace-delimited word: result, move number, NAG or SAN.
fn word<'a>(text: &'a str, offset: usize, tokens: &mut Vec<Token<'a>>) -> Result<()> {
    if RESULTS.contains(&text) {
        tokens.push(Token { kind: TokenKind::Result(text), offset });
        return Ok(());
    }

    if let Some(digits) = text.strip_prefix('$') {
        let nag = digits
            .parse::<u8>()
            .map_err(|_| Error::parse(offset, format!("bad NAG '{}'", text)))?;
        tokens.push(Token { kind: TokenKind::Nag(nag), offset });
        return Ok(());
    }

    // Castling written with zeros.
    if text.starts_with("0-0") {
        return san(text, offset, tokens);
    }

    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let dots = text[digits..].bytes().take_while(|&b| b == b'.').count();
        if dots == 0 {
            return Err(Error::parse(offset, format!("unexpected token '{}'", text)));
        }
        let number = text[..digits]
            .parse()
            .map_err(|_| Error::parse(offset, "move number out of range"))?;
        tokens.push(Token { kind: TokenKind::MoveNumber(number), offset });

        // "1.e4" written without a space.
        let rest = digits + dots;
        if rest < text.len() {
            return word(&text[rest..], offset + rest, tokens);
        }
        return Ok(());
    }

    san(text, offset, tokens)
}

fn san<'a>(text: &'a str, offset: usize, tokens: &mut Vec<Token<'a>>) -> Result<()> {
    let first = text.as_bytes()[0];
    if !matches!(first, b'K' | b'Q' | b'R' | b'B' | b'N' | b'a'..=b'h' | b'O' | b'0' | b'-') {
        return Err(Error::parse(offset, format!("unexpected token '{}'", text)));
    }

    let body_len = text.trim_end_matches(['!', '?']).len();
    let (body, suffix) = text.split_at(body_len);
    let mut nags = Vec::new();
    if !suffix.is_empty() {
        let nag = suffix_nag(suffix)
            .ok_or_else(|| {
                Error::parse(offset + body_len, format!("bad annotation '{}'", suffix))
            })?;
        nags.push(nag);
    }
    if body.is_empty() {
        return Err(Error::parse(offset, format!("unexpected token '{}'", text)));
    }

    tokens.push(Token {
        kind: TokenKind::San { text: body, nags },
        offset,
    });
    Ok(())
}
