//! Source positions attached to nodes
//!
//! Positions are produced by the parser and carried through every rewrite
//! so that diagnostics can point back at the offending source.

use serde::{Deserialize, Serialize};

/// A location in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from the start of the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// The source range a node was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Start point (inclusive)
    pub start: Point,
    /// End point (exclusive)
    pub end: Point,
}

impl Point {
    /// Create a point from line and column
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            offset: None,
        }
    }

    /// Set the byte offset
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl Position {
    /// Create a position spanning two points
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Create a position on a single line
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(Point::new(line, start_column), Point::new(line, end_column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}
