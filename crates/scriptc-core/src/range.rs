//! 1-based source ranges.
//!
//! A [`SourceRange`] is a snapshot of a span in the text that was compiled.
//! Lines and columns are 1-based; the start position is inclusive and the
//! end position exclusive, so `(2,12)-(2,13)` covers exactly one character.
//!
//! Ranges are never re-validated against later edits of the same buffer. A
//! range taken from an old compile may point past the end of the current
//! text.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// A span within the text associated with a source at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    /// Creates a range, rejecting zero coordinates and reversed spans.
    pub fn new(
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidRange {
            start_line,
            start_column,
            end_line,
            end_column,
            reason,
        };

        if start_line == 0 || start_column == 0 || end_line == 0 || end_column == 0 {
            return Err(invalid("coordinates are 1-based"));
        }
        if (end_line, end_column) < (start_line, start_column) {
            return Err(invalid("end precedes start"));
        }

        Ok(SourceRange {
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }

    /// A range covering `width` characters of a single line.
    pub fn on_line(line: u32, column: u32, width: u32) -> Result<Self, CoreError> {
        Self::new(line, column, line, column.saturating_add(width))
    }

    pub fn start(&self) -> (u32, u32) {
        (self.start_line, self.start_column)
    }

    pub fn end(&self) -> (u32, u32) {
        (self.end_line, self.end_column)
    }

    /// True when the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// Whether a 1-based cursor position falls inside the range.
    ///
    /// An empty range contains its own start position, so zero-width
    /// diagnostics can still be reached from the cursor.
    pub fn contains(&self, line: u32, column: u32) -> bool {
        let pos = (line, column);
        if self.is_empty() {
            return pos == self.start();
        }
        pos >= self.start() && pos < self.end()
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_coordinates() {
        let err = SourceRange::new(0, 1, 1, 2).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { start_line: 0, .. }));
        assert!(SourceRange::new(1, 1, 1, 0).is_err());
    }

    #[test]
    fn rejects_reversed_span() {
        assert!(SourceRange::new(3, 1, 2, 9).is_err());
        assert!(SourceRange::new(2, 5, 2, 4).is_err());
    }

    #[test]
    fn multi_line_span_may_end_at_lower_column() {
        let range = SourceRange::new(1, 10, 2, 1).unwrap();
        assert!(range.contains(1, 40));
        assert!(!range.contains(2, 1));
    }

    #[test]
    fn on_line_covers_width() {
        let range = SourceRange::on_line(2, 12, 1).unwrap();
        assert_eq!(range.end(), (2, 13));
        assert!(range.contains(2, 12));
        assert!(!range.contains(2, 13));
        assert!(!range.contains(2, 11));
    }

    #[test]
    fn empty_range_contains_its_start() {
        let range = SourceRange::on_line(4, 7, 0).unwrap();
        assert!(range.is_empty());
        assert!(range.contains(4, 7));
        assert!(!range.contains(4, 8));
    }

    #[test]
    fn display_format() {
        let range = SourceRange::new(2, 12, 2, 13).unwrap();
        assert_eq!(range.to_string(), "(2,12)-(2,13)");
    }
}
