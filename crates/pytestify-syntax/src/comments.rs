//! Trailing comments on headers.
//!
//! `with it('x'):  # slow` cannot keep its comment once the header turns into
//! a `def`, so the comment moves onto its own line right above.

use crate::lines::{Line, SourceLine};

/// Move every header's trailing comment onto a plain line before it.
#[must_use]
pub fn split_header_comments(lines: Vec<Line>) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        match line {
            Line::Header(header) if header.comment.is_some() => {
                let indent = header.line.indent;
                let comment = header.comment.clone().unwrap_or_default();
                out.push(Line::Code(SourceLine {
                    number: header.line.number,
                    indent,
                    text: format!("{}{comment}\n", " ".repeat(indent)),
                }));
                out.push(Line::Header(header.without_comment()));
            }
            other => out.push(other),
        }
    }
    out
}
