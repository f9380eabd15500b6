//! Prose/verbatim partition of a bounded region by fence-token scanning
//!
//! The scan keeps a stack of open fences local to each invocation. When the
//! header and footer tokens are the same (collision mode), a footer match
//! followed by trailing text on its line is read as a nested-fence tag and
//! opens a new level; nested fences are swallowed into the outer prose span.
//! With distinct tokens every footer match closes the innermost fence.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::map::{DocumentMap, SearchToken};
use crate::position::{Position, Range};

/// What a segment holds: surrounding source (`Verbatim`) or fenced literate
/// text (`Prose`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Prose,
    Verbatim,
}

/// A typed, ordered slice of the scanned region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range,
}

impl Segment {
    fn prose(start: Position, end: Position) -> Self {
        Self {
            kind: SegmentKind::Prose,
            range: Range::new(start, end),
        }
    }

    fn verbatim(start: Position, end: Position) -> Self {
        Self {
            kind: SegmentKind::Verbatim,
            range: Range::new(start, end),
        }
    }
}

/// Fence delimiter tokens, matched case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FenceTokens {
    pub header: String,
    pub footer: String,
}

impl Default for FenceTokens {
    fn default() -> Self {
        Self::new("```markdown", "```")
    }
}

impl FenceTokens {
    pub fn new(header: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
        }
    }

    /// Collision mode: header and footer are the same token.
    pub fn collide(&self) -> bool {
        self.header.eq_ignore_ascii_case(&self.footer)
    }
}

/// Partition the map's bounds into prose and verbatim segments.
///
/// An unterminated fence extends to the bounds end as prose; a footer with no
/// open fence is ordinary text.
pub fn find_segments(map: &DocumentMap, tokens: &FenceTokens) -> Result<Vec<Segment>> {
    let bounds = map.bounds();
    let header = SearchToken::case_insensitive(&tokens.header);
    let footer = SearchToken::case_insensitive(&tokens.footer);
    let header_len = tokens.header.chars().count() as isize;
    let footer_len = tokens.footer.chars().count() as isize;
    let collide = tokens.collide();

    let mut segments = Vec::new();
    let mut stack: Vec<Position> = Vec::new();
    let mut anchor = bounds.start;

    while anchor < bounds.end {
        if stack.is_empty() {
            let Some(found) = map.find_first(&header, Some(anchor))? else {
                break;
            };
            if found > anchor {
                segments.push(Segment::verbatim(anchor, map.move_by(found, -1)?));
            }
            anchor = map.move_by(found, header_len)?;
            stack.push(anchor);
            anchor = match map.move_by(anchor, 1) {
                Ok(next) => next,
                Err(_) => break,
            };
        } else {
            let Some(found) = map.find_first(&footer, Some(anchor))? else {
                break;
            };
            anchor = map.move_by(found, footer_len)?;
            if collide {
                let line_end = map.end_of_line(anchor.line);
                let tag = map.text_in_range(Range::new(anchor, line_end), "\n")?;
                if tag.is_empty() {
                    if let Some(top) = stack.pop() {
                        if stack.is_empty() {
                            segments.push(Segment::prose(top, map.move_by(found, -1)?));
                        }
                    }
                } else {
                    // Trailing text after the footer token is a nested-fence
                    // tag; the match opens a level instead of closing one.
                    stack.push(anchor);
                }
                anchor = match map.move_by(line_end, 1) {
                    Ok(next) => next,
                    Err(_) => break,
                };
            } else if let Some(top) = stack.pop() {
                segments.push(Segment::prose(top, map.move_by(found, -1)?));
            }
        }
    }

    match stack.pop() {
        Some(top) if top < bounds.end => segments.push(Segment::prose(top, bounds.end)),
        None if anchor < bounds.end => segments.push(Segment::verbatim(anchor, bounds.end)),
        _ => {}
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Snapshot;

    fn map(text: &str) -> DocumentMap {
        DocumentMap::new(Snapshot::new(text), None).unwrap()
    }

    fn collision_tokens() -> FenceTokens {
        FenceTokens::new("```", "```")
    }

    fn text_of(map: &DocumentMap, segment: &Segment) -> String {
        map.text_in_range(segment.range, "\n").unwrap()
    }

    #[test]
    fn test_no_header_is_all_verbatim() {
        let m = map("fn main() {}\nlet x = 1;");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Verbatim);
        assert_eq!(segments[0].range, m.bounds());
    }

    #[test]
    fn test_basic_fence() {
        let m = map("code();\n```markdown\nhello\n```\nmore();");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].kind, SegmentKind::Verbatim);
        assert_eq!(text_of(&m, &segments[0]), "code();");
        assert_eq!(segments[1].kind, SegmentKind::Prose);
        assert_eq!(text_of(&m, &segments[1]), "\nhello");
        assert_eq!(segments[2].kind, SegmentKind::Verbatim);
        // The trailing segment starts just past the footer token, so its
        // text keeps the separator that followed the fence.
        assert_eq!(text_of(&m, &segments[2]), "\nmore();");
    }

    #[test]
    fn test_header_matches_case_insensitively() {
        let m = map("```MARKDOWN\nhi\n```\n");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        assert_eq!(segments[0].kind, SegmentKind::Prose);
        assert_eq!(text_of(&m, &segments[0]), "\nhi");
    }

    #[test]
    fn test_collision_mode_swallows_nested_fence() {
        let m = map("```markdown\nhello\n```js\nx=1\n```\n```\ntail();");
        let segments = find_segments(&m, &collision_tokens()).unwrap();
        // One prose segment for the whole outer fence; the nested js fence
        // stays inside it verbatim.
        let prose: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Prose)
            .collect();
        assert_eq!(prose.len(), 1);
        let text = text_of(&m, prose[0]);
        assert!(text.contains("```js"));
        assert!(text.contains("x=1"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn test_distinct_tokens_do_not_nest() {
        let m = map("```markdown\nhello\n```js\nx=1\n```\n```\ntail();");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        // The first footer match (the ```js line) closes the outer fence.
        assert_eq!(segments[0].kind, SegmentKind::Prose);
        assert_eq!(text_of(&m, &segments[0]), "\nhello");
    }

    #[test]
    fn test_unterminated_fence_extends_to_bounds_end() {
        let m = map("code();\n```markdown\nstill open");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind, SegmentKind::Verbatim);
        assert_eq!(segments[1].kind, SegmentKind::Prose);
        assert_eq!(segments[1].range.end, m.bounds().end);
    }

    #[test]
    fn test_footer_without_open_fence_is_plain_text() {
        let m = map("code();\n```\nmore();");
        let segments = find_segments(&m, &FenceTokens::new("~~~markdown", "~~~"))
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Verbatim);
        assert_eq!(segments[0].range, m.bounds());
    }

    #[test]
    fn test_fence_at_document_start() {
        let m = map("```markdown\nfirst\n```\ncode();");
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        assert_eq!(segments[0].kind, SegmentKind::Prose);
        assert_eq!(text_of(&m, &segments[0]), "\nfirst");
    }

    #[test]
    fn test_balanced_fences_reconstruct_source() {
        let source = "a();\n```markdown\none\n```\nb();\n```markdown\ntwo\n```\nc();";
        let m = map(source);
        let segments = find_segments(&m, &FenceTokens::default()).unwrap();
        // Ranges are ordered and disjoint; together with the delimiter lines
        // they tile the bounds.
        for pair in segments.windows(2) {
            assert!(pair[0].range.end < pair[1].range.start);
        }
        let prose: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Prose)
            .map(|s| text_of(&m, s))
            .collect();
        assert_eq!(prose, vec!["\none".to_string(), "\ntwo".to_string()]);
        let verbatim: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Verbatim)
            .map(|s| text_of(&m, s))
            .collect();
        assert_eq!(
            verbatim,
            vec!["a();".to_string(), "\nb();".to_string(), "\nc();".to_string()]
        );
    }
}
