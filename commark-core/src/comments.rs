//! Comment discovery and grouping over a [`DocumentMap`]
//!
//! Tokens are matched by literal text search, so a delimiter inside a string
//! literal of the host language still counts as a real delimiter.

use crate::error::Result;
use crate::map::{DocumentMap, SearchToken};
use crate::position::{Position, Range};
use crate::syntax::{BlockSyntax, CommentSyntax};

/// One detected comment. Content positions exclude the delimiter tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommentSpan {
    pub is_block: bool,
    pub start: Position,
    pub content_start: Position,
    pub content_end: Position,
    pub end: Position,
}

impl CommentSpan {
    pub fn content_range(&self) -> Range {
        Range::new(self.content_start, self.content_end)
    }
}

/// A maximal run of adjacent line comments, merged across whitespace-only
/// gaps. A block comment always forms a singleton group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentGroup {
    spans: Vec<CommentSpan>,
}

impl CommentGroup {
    fn new(span: CommentSpan) -> Self {
        Self { spans: vec![span] }
    }

    fn push(&mut self, span: CommentSpan) {
        self.spans.push(span);
    }

    pub fn spans(&self) -> &[CommentSpan] {
        &self.spans
    }

    pub fn first(&self) -> &CommentSpan {
        &self.spans[0]
    }

    pub fn last(&self) -> &CommentSpan {
        &self.spans[self.spans.len() - 1]
    }

    /// Full extent of the group, delimiters included.
    pub fn range(&self) -> Range {
        Range::new(self.first().start, self.last().end)
    }
}

/// Find the next comment at or after `after` (bounds start when `None`).
///
/// When a line token and a block-start token both match, the earlier
/// position wins; an exact tie resolves to the block. An unterminated block
/// extends to the bounds end rather than failing.
pub fn next_comment(
    map: &DocumentMap,
    syntax: &CommentSyntax,
    after: Option<Position>,
) -> Result<Option<CommentSpan>> {
    let line_hit = map.find_first(&SearchToken::literal(&syntax.line), after)?;
    let block = syntax.block.as_ref();
    let block_hit = match block {
        Some(block) => map.find_first(&SearchToken::literal(&block.start), after)?,
        None => None,
    };
    match (line_hit, block.zip(block_hit)) {
        (None, None) => Ok(None),
        (Some(at), None) => line_span(map, syntax, at).map(Some),
        (Some(at), Some((_, block_at))) if at < block_at => line_span(map, syntax, at).map(Some),
        (_, Some((block, block_at))) => block_span(map, block, block_at).map(Some),
    }
}

fn line_span(map: &DocumentMap, syntax: &CommentSyntax, start: Position) -> Result<CommentSpan> {
    let content_start = map.move_by(start, syntax.line.chars().count() as isize)?;
    let end = map.end_of_line(start.line);
    Ok(CommentSpan {
        is_block: false,
        start,
        content_start,
        content_end: end,
        end,
    })
}

fn block_span(map: &DocumentMap, block: &BlockSyntax, start: Position) -> Result<CommentSpan> {
    let content_start = map.move_by(start, block.start.chars().count() as isize)?;
    let close = map.find_first(&SearchToken::literal(&block.end), Some(content_start))?;
    match close {
        Some(at) => Ok(CommentSpan {
            is_block: true,
            start,
            content_start,
            content_end: map.move_by(at, -1)?,
            end: map.move_by(at, block.end.chars().count() as isize - 1)?,
        }),
        // Unterminated block: content and span collapse to the bounds end.
        None => Ok(CommentSpan {
            is_block: true,
            start,
            content_start,
            content_end: map.bounds().end,
            end: map.bounds().end,
        }),
    }
}

/// Collect every comment in bounds into ordered groups.
pub fn group_comments(map: &DocumentMap, syntax: &CommentSyntax) -> Result<Vec<CommentGroup>> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    let mut after: Option<Position> = None;
    while let Some(span) = next_comment(map, syntax, after)? {
        let join = match groups.last() {
            Some(group) => joins(map, group.last(), &span)?,
            None => false,
        };
        match groups.last_mut() {
            Some(group) if join => group.push(span),
            _ => groups.push(CommentGroup::new(span)),
        }
        if span.end >= map.bounds().end {
            break;
        }
        after = Some(map.move_by(span.end, 1)?);
    }
    Ok(groups)
}

/// Two spans join when both are line comments and the text strictly between
/// them is whitespace only.
fn joins(map: &DocumentMap, prev: &CommentSpan, next: &CommentSpan) -> Result<bool> {
    if prev.is_block || next.is_block {
        return Ok(false);
    }
    let from = map.move_by(prev.end, 1)?;
    let to = map.move_by(next.start, -1)?;
    if from > to {
        return Ok(true);
    }
    let between = map.text_in_range(Range::new(from, to), "\n")?;
    Ok(between.chars().all(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Snapshot;

    fn map(text: &str) -> DocumentMap {
        DocumentMap::new(Snapshot::new(text), None).unwrap()
    }

    fn rust_syntax() -> CommentSyntax {
        CommentSyntax::with_block("//", "/*", "*/")
    }

    #[test]
    fn test_no_comment_tokens() {
        let m = map("fn main() {}\nlet x = 1;");
        assert_eq!(next_comment(&m, &rust_syntax(), None).unwrap(), None);
        assert!(group_comments(&m, &rust_syntax()).unwrap().is_empty());
    }

    #[test]
    fn test_line_comment_span() {
        let m = map("let x = 1; // note\ncode();");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(!span.is_block);
        assert_eq!(span.start, Position::new(0, 11));
        assert_eq!(span.content_start, Position::new(0, 13));
        assert_eq!(span.end, Position::new(0, 18));
        assert_eq!(m.text_in_range(span.content_range(), "\n").unwrap().trim(), "note");
    }

    #[test]
    fn test_block_comment_span() {
        let m = map("a /* inner */ b");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(span.is_block);
        assert_eq!(span.start, Position::new(0, 2));
        assert_eq!(span.content_start, Position::new(0, 4));
        assert_eq!(span.content_end, Position::new(0, 10));
        assert_eq!(span.end, Position::new(0, 12));
        assert_eq!(m.text_in_range(span.content_range(), "\n").unwrap(), " inner ");
    }

    #[test]
    fn test_earlier_token_wins() {
        let m = map("/* b */ // l");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(span.is_block);

        let m = map("// l /* not a block on its own */");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(!span.is_block);
        assert_eq!(span.end, m.bounds().end);
    }

    #[test]
    fn test_unterminated_block_extends_to_bounds_end() {
        let m = map("x /* open\nmore text");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(span.is_block);
        assert_eq!(span.content_start, Position::new(0, 4));
        assert_eq!(span.content_end, m.bounds().end);
        assert_eq!(span.end, m.bounds().end);
    }

    #[test]
    fn test_multi_line_block() {
        let m = map("/*\nline one\nline two\n*/\ncode();");
        let span = next_comment(&m, &rust_syntax(), None).unwrap().unwrap();
        assert!(span.is_block);
        assert_eq!(span.start, Position::new(0, 0));
        assert_eq!(span.end, Position::new(3, 1));
        let content = m.text_in_range(span.content_range(), "\n").unwrap();
        assert_eq!(content.trim(), "line one\nline two");
    }

    #[test]
    fn test_blank_gap_merges_line_comments() {
        let m = map("// a\n   \n// b");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].spans().len(), 2);
    }

    #[test]
    fn test_code_gap_splits_groups() {
        let m = map("// a\ncode();\n// b");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].spans().len(), 1);
        assert_eq!(groups[1].spans().len(), 1);
    }

    #[test]
    fn test_adjacent_line_comments_merge() {
        let m = map("// a\n// b\n// c");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].spans().len(), 3);
    }

    #[test]
    fn test_block_comment_is_singleton_group() {
        let m = map("// a\n/* b */\n// c");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups[1].first().is_block);
    }

    #[test]
    fn test_groups_strictly_increasing() {
        let m = map("// a\n\n// b\nfn f() {} // c\n/* d */");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        let mut previous: Option<Range> = None;
        for group in &groups {
            assert!(!group.spans().is_empty());
            let range = group.range();
            if let Some(prev) = previous {
                assert!(prev.end < range.start);
            }
            previous = Some(range);
        }
    }

    #[test]
    fn test_line_only_syntax_ignores_block_tokens() {
        let m = map("x = 1 /* not python */\n# real");
        let syntax = CommentSyntax::line_only("#");
        let groups = group_comments(&m, &syntax).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first().start, Position::new(1, 0));
    }

    #[test]
    fn test_token_past_bounds_column_is_not_a_comment() {
        let snap = Snapshot::new("code();\nlet x = 1; // tail note");
        let m = DocumentMap::new(snap, Some(Range::from_coords(0, 0, 1, 3))).unwrap();
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_comment_at_bounds_end() {
        let m = map("code();\n// tail");
        let groups = group_comments(&m, &rust_syntax()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].last().end, m.bounds().end);
    }
}
