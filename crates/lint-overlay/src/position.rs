//! Logical positions and ranges.
//!
//! Positions are zero-based `(line, column)` pairs. Whether a column counts characters (buffer
//! coordinates) or display cells (screen coordinates) is decided by the API that receives it;
//! the types themselves are shared.

use std::cmp::Ordering;
use std::fmt;

/// Logical position (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column within the line.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// A position past the last column of `line`.
    ///
    /// Hosts clip this to the real line length when marking a range.
    pub fn line_end(line: usize) -> Self {
        Self {
            line,
            column: usize::MAX,
        }
    }

    /// Returns `true` if this position uses the end-of-line sentinel column.
    pub fn is_line_end(&self) -> bool {
        self.column == usize::MAX
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_line_end() {
            write!(f, "({}, eol)", self.line)
        } else {
            write!(f, "({}, {})", self.line, self.column)
        }
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Self::new(line, column)
    }
}

/// A closed range between two positions, always stored with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// Range start.
    pub start: Position,
    /// Range end.
    pub end: Position,
}

impl Range {
    /// Create a range from two endpoints in either order.
    pub fn new(a: impl Into<Position>, b: impl Into<Position>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at `position`.
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns `true` if `start == end`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the range starts and ends on different lines.
    pub fn is_multi_line(&self) -> bool {
        self.start.line != self.end.line
    }

    /// Returns `true` if `position` lies inside the range, endpoints included.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}
