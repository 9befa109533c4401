//! Engine options.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::pgn::WriteOptions;

/// How an imported record combines with the current tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Build a fresh tree from the record.
    #[default]
    Replace,
    /// Add the record's lines to the current tree, reusing existing moves.
    Merge,
}

impl FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(ImportMode::Replace),
            "merge" => Ok(ImportMode::Merge),
            _ => Err(Error::InvalidOption {
                name: "ImportMode".to_string(),
                value: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Replace => write!(f, "replace"),
            ImportMode::Merge => write!(f, "merge"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Play the opponent's reply after a correct puzzle move.
    pub auto_reply: bool,
    /// Export only the main line.
    pub export_main_line_only: bool,
    /// Export comments and annotation glyphs.
    pub export_comments: bool,
    pub import_mode: ImportMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_reply: true,
            export_main_line_only: false,
            export_comments: true,
            import_mode: ImportMode::Replace,
        }
    }
}

impl EngineConfig {
    pub fn with_auto_reply(mut self, auto_reply: bool) -> Self {
        self.auto_reply = auto_reply;
        self
    }

    pub fn with_main_line_only(mut self, main_line_only: bool) -> Self {
        self.export_main_line_only = main_line_only;
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.export_comments = comments;
        self
    }

    pub fn with_import_mode(mut self, mode: ImportMode) -> Self {
        self.import_mode = mode;
        self
    }

    pub(crate) fn write_options(&self) -> WriteOptions {
        WriteOptions {
            main_line_only: self.export_main_line_only,
            comments: self.export_comments,
        }
    }

    /// Option declarations, one per line, in `option name ... type ...` form.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("option name AutoReply type check default {}", self.auto_reply),
            format!(
                "option name MainLineOnly type check default {}",
                self.export_main_line_only
            ),
            format!("option name Comments type check default {}", self.export_comments),
            format!(
                "option name ImportMode type combo default {} var replace var merge",
                self.import_mode
            ),
        ]
    }

    /// Set an option by name. Names ignore case, spaces and underscores.
    pub fn apply_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let opt = name.to_lowercase().replace([' ', '_'], "");
        let raw = value.unwrap_or("").trim();
        let invalid = || Error::InvalidOption {
            name: name.trim().to_string(),
            value: raw.to_string(),
        };
        let flag = || parse_flag(raw).ok_or_else(invalid);

        match opt.as_str() {
            "autoreply" => self.auto_reply = flag()?,
            "mainlineonly" | "exportmainlineonly" => self.export_main_line_only = flag()?,
            "comments" | "exportcomments" => self.export_comments = flag()?,
            "importmode" => self.import_mode = raw.parse()?,
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" || value.eq_ignore_ascii_case("on") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false")
        || value == "0"
        || value.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        None
    }
}
