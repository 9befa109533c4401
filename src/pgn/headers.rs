//! Ordered PGN header tags.

use chrono::NaiveDate;

/// Seven Tag Roster, written first and in this order.
pub const SEVEN_TAG_ROSTER: [&str; 7] =
    ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

const DATE_FORMAT: &str = "%Y.%m.%d";

/// Header tags in insertion order. Keys are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    tags: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers for a new study dated `date`.
    pub fn dated(date: NaiveDate) -> Self {
        let mut headers = Self::new();
        headers.set_date(date);
        headers
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.tags.push((key, value)),
        }
    }

    /// Set `key` only when it is not present yet.
    pub fn set_default(&mut self, key: &str, value: &str) {
        if self.get(key).is_none() {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let at = self.tags.iter().position(|(k, _)| k == key)?;
        Some(self.tags.remove(at).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The `Date` tag as a calendar date. Returns `None` when the tag is
    /// missing or any part is unknown (`????.??.??`).
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.get("Date")?, DATE_FORMAT).ok()
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.set("Date", date.format(DATE_FORMAT).to_string());
    }

    /// Game result tag, `*` when absent.
    pub fn result(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    /// Starting position given by `FEN`, if any.
    pub fn fen(&self) -> Option<&str> {
        self.get("FEN")
    }

    /// Tags in export order: the roster first, then the rest as inserted.
    pub(crate) fn export_order(&self) -> Vec<(&str, String)> {
        let mut out: Vec<(&str, String)> = SEVEN_TAG_ROSTER
            .iter()
            .map(|&key| {
                let fallback = match key {
                    "Date" => "????.??.??",
                    "Result" => "*",
                    _ => "?",
                };
                (key, self.get(key).unwrap_or(fallback).to_string())
            })
            .collect();
        out.extend(
            self.iter()
                .filter(|(k, _)| !SEVEN_TAG_ROSTER.contains(k))
                .map(|(k, v)| (k, v.to_string())),
        );
        out
    }
}
