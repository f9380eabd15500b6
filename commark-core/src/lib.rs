//! Commark Core - literate comments extracted and re-composed as markdown
//!
//! This crate contains the core logic for commark, independent of any editor
//! or CLI concerns:
//! - Position arithmetic over an immutable line-oriented snapshot
//! - Comment discovery and grouping driven by per-language comment syntax
//! - Prose/verbatim partitioning by nesting-aware fence scanning
//! - Composition of the extracted pieces into one markdown document
//! - Comment-syntax registry and configuration management
//!
//! Scanning is synchronous and side-effect free; all values are computed
//! fresh from a snapshot and none outlive it.

pub mod chunk;
pub mod comments;
pub mod compose;
pub mod config;
pub mod error;
pub mod fences;
pub mod map;
pub mod position;
pub mod syntax;
pub mod uri;

// Re-export commonly used types
pub use chunk::Chunk;
pub use comments::{group_comments, next_comment, CommentGroup, CommentSpan};
pub use compose::{compose_groups, compose_segments};
pub use config::Config;
pub use error::Error;
pub use fences::{find_segments, FenceTokens, Segment, SegmentKind};
pub use map::{DocumentMap, SearchToken, Snapshot};
pub use position::{Position, Range};
pub use syntax::{CommentSyntax, SyntaxRegistry};
