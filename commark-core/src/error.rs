//! Failure values returned by the scanning core

use thiserror::Error;

/// Errors raised by position arithmetic, scanning, and chunk parsing.
///
/// Unterminated block comments and unterminated fences are not errors;
/// those constructs extend to the end of the map's bounds instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A position or range lies outside the map's bounds.
    #[error("invalid range")]
    InvalidRange,
    /// A move would step past the start or the end of the text.
    #[error("invalid distance")]
    InvalidDistance,
    /// No comment syntax is registered for the language id.
    #[error("unknown language id: {0}")]
    UnknownLanguage(String),
    /// A chunk key does not follow the `commark:///?source#range` shape.
    #[error("invalid chunk key: {0}")]
    InvalidChunk(String),
}

pub type Result<T> = std::result::Result<T, Error>;
