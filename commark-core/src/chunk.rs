//! Stable keys for rendered document chunks
//!
//! A chunk names a source document plus an optional sub-range. Integration
//! layers use the key as a cache or watch identity; the core only defines
//! the encoding and its exact reverse.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::position::{Position, Range};
use crate::uri;

pub const SCHEME: &str = "commark";

/// A source document plus an optional bounded sub-range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub source: PathBuf,
    pub range: Option<Range>,
}

impl Chunk {
    pub fn new(source: impl Into<PathBuf>, range: Option<Range>) -> Self {
        Self {
            source: source.into(),
            range,
        }
    }

    /// Key of the form `commark:///?<escaped source>#<range>` where the
    /// range part is `line~column-line~column`, or empty for a whole
    /// document.
    pub fn key(&self) -> String {
        let source = uri::encode_segment(&self.source.to_string_lossy());
        format!("{SCHEME}:///?{source}#{}", range_to_string(self.range))
    }

    pub fn parse(key: &str) -> Result<Self> {
        let invalid = || Error::InvalidChunk(key.to_string());
        let rest = key
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix(":///?"))
            .ok_or_else(invalid)?;
        let (source, fragment) = rest.split_once('#').ok_or_else(invalid)?;
        Ok(Self {
            source: PathBuf::from(uri::decode_segment(source)),
            range: parse_range(fragment, key)?,
        })
    }
}

fn position_to_string(position: Position) -> String {
    format!("{}~{}", position.line, position.column)
}

fn range_to_string(range: Option<Range>) -> String {
    match range {
        None => String::new(),
        Some(range) => format!(
            "{}-{}",
            position_to_string(range.start),
            position_to_string(range.end)
        ),
    }
}

fn parse_position(s: &str, key: &str) -> Result<Position> {
    let invalid = || Error::InvalidChunk(key.to_string());
    let (line, column) = s.split_once('~').ok_or_else(invalid)?;
    Ok(Position::new(
        line.parse().map_err(|_| invalid())?,
        column.parse().map_err(|_| invalid())?,
    ))
}

fn parse_range(s: &str, key: &str) -> Result<Option<Range>> {
    if s.is_empty() {
        return Ok(None);
    }
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| Error::InvalidChunk(key.to_string()))?;
    Ok(Some(Range::new(
        parse_position(start, key)?,
        parse_position(end, key)?,
    )))
}
