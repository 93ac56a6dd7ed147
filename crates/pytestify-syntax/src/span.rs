//! Source location tracking for AST nodes.

/// A range of source lines covered by a node.
///
/// Line numbers are 1-based so they can be shown to users as-is. A span whose
/// start line is 0 is a dummy span for synthesized nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First line (1-based, inclusive).
    pub start_line: u32,
    /// Last line (1-based, inclusive).
    pub end_line: u32,
}

impl Span {
    /// Create a span covering `start_line..=end_line`.
    #[must_use]
    pub const fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Create a span covering a single line.
    #[must_use]
    pub const fn line(line: u32) -> Self {
        Self::new(line, line)
    }

    /// Create a dummy span (for synthesized nodes).
    #[must_use]
    pub const fn dummy() -> Self {
        Self {
            start_line: 0,
            end_line: 0,
        }
    }

    /// Check if this span is a dummy span.
    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.start_line == 0
    }

    /// Number of lines covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        if self.is_dummy() {
            0
        } else {
            self.end_line - self.start_line + 1
        }
    }

    /// Check if the span covers no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge two spans to create a span covering both.
    ///
    /// Dummy spans are absorbed by real ones.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_dummy() {
            return *other;
        }
        if other.is_dummy() {
            return *self;
        }
        Self {
            start_line: self.start_line.min(other.start_line),
            end_line: self.end_line.max(other.end_line),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "line {}", self.start_line)
        } else {
            write!(f, "lines {}-{}", self.start_line, self.end_line)
        }
    }
}
