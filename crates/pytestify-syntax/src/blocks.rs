//! Grouping plain lines into code chunks.

use crate::ast::{CodeChunk, UNBOUNDED_INDENT};
use crate::lines::{Header, Line, MethodHeader, SourceLine};
use crate::span::Span;

/// A header or a chunk of plain lines, ready for the tree builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Consecutive plain and blank lines.
    Chunk(CodeChunk),
    /// A `with` header.
    Header(Header),
    /// A helper method header.
    Method(MethodHeader),
}

impl Item {
    /// Indentation used by the off-side rule.
    #[must_use]
    pub const fn indent(&self) -> usize {
        match self {
            Self::Chunk(chunk) => chunk.indent,
            Self::Header(header) => header.line.indent,
            Self::Method(method) => method.line.indent,
        }
    }
}

/// Lines collected so far for the chunk being built.
#[derive(Default)]
struct Pending {
    lines: Vec<SourceLine>,
    indent: Option<usize>,
}

impl Pending {
    /// A plain line joins the chunk unless it dedents below its baseline.
    fn accepts(&self, line: &Line) -> bool {
        match (line, self.indent) {
            (Line::Codeless(_), _) | (_, None) => true,
            (line, Some(indent)) => line.indent() >= indent,
        }
    }

    fn push(&mut self, line: Line) {
        if self.indent.is_none() && !matches!(line, Line::Codeless(_)) {
            self.indent = Some(line.indent());
        }
        self.lines.push(line.source().clone());
    }

    fn flush(&mut self, out: &mut Vec<Item>) {
        let Some(first) = self.lines.first() else {
            return;
        };
        let last = self.lines.last().unwrap_or(first);
        let span = Span::new(first.number, last.number);
        let text: String = self.lines.iter().map(|line| line.text.as_str()).collect();
        let indent = self.indent.unwrap_or(UNBOUNDED_INDENT);
        out.push(Item::Chunk(CodeChunk::new(indent, text, span)));
        *self = Self::default();
    }
}

/// Coalesce runs of plain lines into [`CodeChunk`]s, stopping at headers.
///
/// A chunk's baseline is the indentation of its first line of code; a later
/// line indented less than that starts a new chunk.
#[must_use]
pub fn group_into_items(lines: Vec<Line>) -> Vec<Item> {
    let mut out = Vec::new();
    let mut pending = Pending::default();

    for line in lines {
        match line {
            Line::Header(header) => {
                pending.flush(&mut out);
                out.push(Item::Header(header));
            }
            Line::Method(method) => {
                pending.flush(&mut out);
                out.push(Item::Method(method));
            }
            line @ (Line::Codeless(_) | Line::Code(_) | Line::Opaque(_)) => {
                if !pending.accepts(&line) {
                    pending.flush(&mut out);
                }
                pending.push(line);
            }
        }
    }
    pending.flush(&mut out);

    out
}
