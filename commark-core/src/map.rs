//! Line/column arithmetic over an immutable text snapshot
//!
//! [`DocumentMap`] restricts every operation to a sub-region of the snapshot
//! (its bounds) and is the only way the scanners move through or extract
//! text. Crossing a line boundary costs one extra virtual unit representing
//! the line separator, so `move_by` round-trips exactly:
//! `move_by(move_by(p, d), -d) == p` whenever neither step leaves bounds.

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::position::{Position, Range};

/// An immutable, line-oriented view of a text buffer.
///
/// Line terminators (LF or CRLF) are stripped from line text; the virtual
/// separator is accounted for by [`DocumentMap::move_by`] instead.
#[derive(Clone, Debug)]
pub struct Snapshot {
    rope: Rope,
}

impl Snapshot {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of one line without its terminator. Panics when `line` is out of
    /// the snapshot; callers stay within bounds checked by the map.
    pub fn line_text(&self, line: usize) -> String {
        let mut text: String = self.rope.line(line).chunks().collect();
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        text
    }

    /// Length of one line in characters, terminator excluded.
    pub fn line_len(&self, line: usize) -> usize {
        self.line_text(line).chars().count()
    }
}

/// A per-line search predicate as an explicit value.
///
/// Applied to a line's text starting at a given column; yields the column of
/// the first match. An empty token never matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchToken {
    Literal(String),
    CaseInsensitive(String),
}

impl SearchToken {
    pub fn literal(token: impl Into<String>) -> Self {
        Self::Literal(token.into())
    }

    pub fn case_insensitive(token: impl Into<String>) -> Self {
        Self::CaseInsensitive(token.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Literal(token) | Self::CaseInsensitive(token) => token,
        }
    }

    /// First match column at or after `from`, in character offsets.
    pub fn find_in(&self, line: &str, from: usize) -> Option<usize> {
        let haystack: Vec<char> = line.chars().collect();
        let needle: Vec<char> = self.text().chars().collect();
        if needle.is_empty() {
            return None;
        }
        let ignore_case = matches!(self, Self::CaseInsensitive(_));
        let mut column = from;
        while column + needle.len() <= haystack.len() {
            let window = &haystack[column..column + needle.len()];
            let hit = window.iter().zip(&needle).all(|(a, b)| {
                if ignore_case {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a == b
                }
            });
            if hit {
                return Some(column);
            }
            column += 1;
        }
        None
    }
}

/// Position arithmetic over a [`Snapshot`], restricted to `bounds`.
#[derive(Clone, Debug)]
pub struct DocumentMap {
    snapshot: Snapshot,
    bounds: Range,
}

impl DocumentMap {
    /// Build a map over the whole snapshot, or over an explicit sub-region.
    pub fn new(snapshot: Snapshot, bounds: Option<Range>) -> Result<Self> {
        let last_line = snapshot.line_count() - 1;
        let full = Range::from_coords(0, 0, last_line, snapshot.line_len(last_line));
        let bounds = match bounds {
            Some(requested) => {
                if !full.contains_range(requested) {
                    return Err(Error::InvalidRange);
                }
                requested
            }
            None => full,
        };
        Ok(Self { snapshot, bounds })
    }

    pub fn bounds(&self) -> Range {
        self.bounds
    }

    pub fn line_count(&self) -> usize {
        self.snapshot.line_count()
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.snapshot.line_len(line)
    }

    pub fn line_text(&self, line: usize) -> String {
        self.snapshot.line_text(line)
    }

    /// Characters `[from, to)` of a line, clamped to the line's end.
    fn line_slice(&self, line: usize, from: usize, to: usize) -> String {
        self.snapshot
            .line_text(line)
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .collect()
    }

    /// Walk `distance` characters from `position`, counting one unit per
    /// crossed line separator. Negative distances walk backward.
    pub fn move_by(&self, position: Position, distance: isize) -> Result<Position> {
        let mut line = position.line;
        let mut remaining = distance + position.column as isize;
        while remaining < 0 {
            if line == 0 {
                return Err(Error::InvalidDistance);
            }
            line -= 1;
            remaining += self.line_len(line) as isize + 1;
        }
        let mut line_length = self.line_len(line) as isize;
        while remaining > line_length {
            line += 1;
            if line >= self.line_count() {
                return Err(Error::InvalidDistance);
            }
            remaining -= line_length + 1;
            line_length = self.line_len(line) as isize;
        }
        Ok(Position::new(line, remaining as usize))
    }

    /// Inclusive substring of `range`, lines joined by `separator`.
    pub fn text_in_range(&self, range: Range, separator: &str) -> Result<String> {
        if !self.bounds.contains_range(range) {
            return Err(Error::InvalidRange);
        }
        if range.is_single_line() {
            return Ok(self.line_slice(range.start.line, range.start.column, range.end.column + 1));
        }
        let mut text = self.line_slice(
            range.start.line,
            range.start.column,
            self.line_len(range.start.line),
        );
        text.push_str(separator);
        for line in range.start.line + 1..range.end.line {
            text.push_str(&self.line_text(line));
            text.push_str(separator);
        }
        text.push_str(&self.line_slice(range.end.line, 0, range.end.column + 1));
        Ok(text)
    }

    /// End-of-bounds for the bounds' last line, otherwise the position just
    /// past the line's last character.
    pub fn end_of_line(&self, line: usize) -> Position {
        if line == self.bounds.end.line {
            self.bounds.end
        } else {
            Position::new(line, self.line_len(line))
        }
    }

    /// Scan forward line by line from `after` (or the bounds start) and
    /// return the first position where `token` matches.
    pub fn find_first(&self, token: &SearchToken, after: Option<Position>) -> Result<Option<Position>> {
        let mut anchor = after.unwrap_or(self.bounds.start);
        if !self.bounds.contains(anchor) {
            return Err(Error::InvalidRange);
        }
        while self.bounds.contains(anchor) {
            if let Some(column) = token.find_in(&self.line_text(anchor.line), anchor.column) {
                let found = Position::new(anchor.line, column);
                // A match past the bounds end on the last bounded line is
                // outside the map and does not count.
                if !self.bounds.contains(found) {
                    return Ok(None);
                }
                return Ok(Some(found));
            }
            anchor = Position::new(anchor.line + 1, 0);
        }
        Ok(None)
    }
}
