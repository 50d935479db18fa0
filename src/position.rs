//! Source positions and spans.
//!
//! A [`Position`] names a single point (or a short run) in a named source
//! file using 1-indexed line and column numbers. A [`Span`] is the
//! byte-offset-only counterpart used on [`Token`](crate::token::Token) and
//! [`Diagnostic`](crate::diagnostic::Diagnostic) — it is cheap to copy and
//! does not require re-scanning the source to produce.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte-offset range `[start_offset, end_offset)` into a source buffer.
///
/// Unlike [`Position`], a `Span` carries no line/column information; it is
/// the representation tokens and diagnostics carry around while scanning,
/// and is converted to a [`Position`] only when something needs to be shown
/// to a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first byte covered by the span.
    pub start_offset: usize,
    /// Byte offset one past the last byte covered by the span.
    pub end_offset: usize,
}

impl Span {
    /// Creates a span covering `[start_offset, end_offset)`.
    ///
    /// If `end_offset < start_offset` the end is clamped up to `start_offset`
    /// rather than panicking — the core never panics on malformed internal
    /// state, it normalizes it.
    pub fn new(start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_offset,
            end_offset: end_offset.max(start_offset),
        }
    }

    /// A zero-width span at `offset`.
    pub fn at(offset: usize) -> Self {
        Self {
            start_offset: offset,
            end_offset: offset,
        }
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start_offset: self.start_offset.min(other.start_offset),
            end_offset: self.end_offset.max(other.end_offset),
        }
    }
}

/// A human-facing source position: a file name plus 1-indexed line and
/// column numbers.
///
/// `end_col == start_col` for single-character positions; `end_col` is
/// always `>= start_col` once normalized (see [`Position::new`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Name of the source file (or buffer) this position is in.
    pub name: String,
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed start column.
    pub start_col: usize,
    /// 1-indexed end column (inclusive of the last character covered).
    pub end_col: usize,
}

impl Position {
    /// Creates a new position, clamping `end_col` up to `start_col` if the
    /// caller passed an inverted range.
    pub fn new(
        name: impl Into<String>,
        offset: usize,
        line: usize,
        start_col: usize,
        end_col: usize,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            line,
            start_col,
            end_col: end_col.max(start_col),
        }
    }

    /// A single-character position (`start_col == end_col`).
    pub fn single(name: impl Into<String>, offset: usize, line: usize, col: usize) -> Self {
        Self::new(name, offset, line, col, col)
    }

    /// A position is valid iff the name is non-empty, the line is at least
    /// 1, the start column is at least 1, and the end column is not before
    /// the start column.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.line >= 1 && self.start_col >= 1 && self.end_col >= self.start_col
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(
                f,
                "BadPosition: {{name: {:?}, offset: {}, line: {}, start_col: {}, end_col: {}}}",
                self.name, self.offset, self.line, self.start_col, self.end_col
            );
        }
        if self.start_col == self.end_col {
            write!(f, "{}:{}:{}", self.name, self.line, self.start_col)
        } else {
            write!(
                f,
                "{}:{}:{}-{}",
                self.name, self.line, self.start_col, self.end_col
            )
        }
    }
}

/// Maps byte offsets into a source buffer to 1-indexed `(line, column)`
/// pairs, so the scanner/parser/resolver — which only ever carry byte
/// offsets on [`Token`](crate::token::Token)s and [`Span`]s — can produce a
/// human-facing [`Position`] on demand, without tracking line/column state
/// during the hot scanning loop.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Builds a line index over `src`. O(n) to build, O(log n) per lookup.
    pub fn new(src: &[u8]) -> Self {
        let mut line_starts = vec![0usize];
        for (i, &b) in src.iter().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: src.len(),
        }
    }

    /// Converts a byte offset into a 1-indexed `(line, column)` pair.
    /// Offsets past the end of the source clamp to the last line.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let col = offset - self.line_starts[line_idx] + 1;
        (line_idx + 1, col)
    }

    /// Builds a [`Position`] for a byte span `[start, end)` in `name`.
    pub fn position(&self, name: impl Into<String>, start: usize, end: usize) -> Position {
        let name = name.into();
        let (line, start_col) = self.line_col(start);
        let end_col = if end > start {
            let (end_line, end_col) = self.line_col(end.saturating_sub(1));
            if end_line == line {
                end_col
            } else {
                // Span crosses a line boundary; report only the start line,
                // collapsing the end column to the start (still a valid
                // position, just not a precise multi-line range).
                start_col
            }
        } else {
            start_col
        };
        Position::new(name, start, line, start_col, end_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_column_formats_as_name_line_col() {
        let p = Position::single("a.http", 10, 3, 5);
        assert!(p.is_valid());
        assert_eq!(p.to_string(), "a.http:3:5");
    }

    #[test]
    fn valid_range_formats_as_name_line_start_end() {
        let p = Position::new("a.http", 10, 3, 5, 9);
        assert!(p.is_valid());
        assert_eq!(p.to_string(), "a.http:3:5-9");
    }

    #[test]
    fn empty_name_is_invalid() {
        let p = Position::new("", 0, 1, 1, 1);
        assert!(!p.is_valid());
        assert!(p.to_string().starts_with("BadPosition:"));
    }

    #[test]
    fn zero_line_is_invalid() {
        let p = Position::new("a.http", 0, 0, 1, 1);
        assert!(!p.is_valid());
    }

    #[test]
    fn inverted_columns_are_normalized_not_invalid() {
        let p = Position::new("a.http", 0, 1, 5, 2);
        assert_eq!(p.end_col, 5);
        assert!(p.is_valid());
    }

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(2, 5);
        let b = Span::new(10, 12);
        let m = a.merge(b);
        assert_eq!(m.start_offset, 2);
        assert_eq!(m.end_offset, 12);
    }

    #[test]
    fn line_index_finds_lines() {
        let src = b"GET a\nHeader: b\n\nbody\n";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(4), (1, 5));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(17), (3, 1));
    }

    #[test]
    fn line_index_position_is_valid() {
        let src = b"GET http://x\n";
        let idx = LineIndex::new(src);
        let pos = idx.position("f.http", 4, 12);
        assert!(pos.is_valid());
        assert_eq!(pos.line, 1);
    }
}
