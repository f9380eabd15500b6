//! Stitch scanned spans or segments back into one markdown document
//!
//! Prose text gets its image links rewritten so relative paths keep working
//! from wherever the composed document is rendered; verbatim text is wrapped
//! in a fence tagged with the caller's language id. Zero-length pieces are
//! dropped rather than emitted as empty fenced blocks.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

use crate::comments::CommentGroup;
use crate::error::Result;
use crate::fences::{Segment, SegmentKind};
use crate::map::DocumentMap;
use crate::position::Range;
use crate::uri;

static IMAGE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\[\]]*)\]\(([^()]*)\)").expect("image link pattern"));

/// Rewrite `![label](path)` constructs in prose text.
///
/// Paths with a scheme pass through; absolute paths become file URIs;
/// relative paths resolve against `base` (the originating document's
/// folder). Rewritten targets are escaped with [`uri::encode_segment`].
fn correct_image_links(text: &str, base: Option<&Path>) -> String {
    IMAGE_LINK
        .replace_all(text, |caps: &Captures<'_>| {
            let label = &caps[1];
            let path = caps[2].trim();
            format!("![{label}]({})", rewrite_path(path, base))
        })
        .into_owned()
}

fn rewrite_path(path: &str, base: Option<&Path>) -> String {
    if uri::has_scheme(path) {
        path.to_string()
    } else if uri::is_absolute(path) {
        uri::encode_segment(&uri::file_uri(path))
    } else if let Some(base) = base {
        uri::encode_segment(&uri::file_uri(&uri::join_relative(base, path)))
    } else {
        path.to_string()
    }
}

fn append_fenced(out: &mut String, text: &str, language: &str) {
    if text.is_empty() {
        return;
    }
    out.push_str("```");
    out.push_str(language);
    out.push('\n');
    out.push_str(text);
    out.push('\n');
    out.push_str("```\n");
}

fn append_prose(out: &mut String, text: &str, base: Option<&Path>) {
    if text.is_empty() {
        return;
    }
    out.push_str(&correct_image_links(text, base));
    out.push('\n');
}

/// Compose comment groups into one document: source between groups becomes
/// fenced code (skipped when whitespace-only), group content becomes prose.
pub fn compose_groups(
    map: &DocumentMap,
    groups: &[CommentGroup],
    language: &str,
    base: Option<&Path>,
) -> Result<String> {
    let mut out = String::new();
    let mut anchor = map.bounds().start;
    for group in groups {
        let first = group.first();
        if anchor < first.start {
            let gap = Range::new(anchor, map.move_by(first.start, -1)?);
            let text = map.text_in_range(gap, "\n")?;
            if !text.chars().all(char::is_whitespace) {
                append_fenced(&mut out, &text, language);
            }
        }

        // One blank-line separated prose block per group; spans are trimmed
        // individually and joined by single newlines.
        let mut parts = Vec::with_capacity(group.spans().len());
        for span in group.spans() {
            let text = map.text_in_range(span.content_range(), "\n")?;
            parts.push(text.trim().to_string());
        }
        append_prose(&mut out, &parts.join("\n"), base);

        let end = group.last().end;
        anchor = if end < map.bounds().end {
            map.move_by(end, 1)?
        } else {
            map.bounds().end
        };
    }
    if anchor < map.bounds().end {
        let text = map.text_in_range(Range::new(anchor, map.bounds().end), "\n")?;
        append_fenced(&mut out, &text, language);
    }
    Ok(out)
}

/// Compose fence-scanner segments: prose as-is, verbatim fenced.
pub fn compose_segments(
    map: &DocumentMap,
    segments: &[Segment],
    language: &str,
    base: Option<&Path>,
) -> Result<String> {
    let mut out = String::new();
    for segment in segments {
        let text = map.text_in_range(segment.range, "\n")?;
        match segment.kind {
            SegmentKind::Prose => append_prose(&mut out, &text, base),
            SegmentKind::Verbatim => append_fenced(&mut out, &text, language),
        }
    }
    Ok(out)
}
