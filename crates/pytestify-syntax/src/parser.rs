//! Parser that turns mamba source text into a typed AST.
//!
//! Parsing is a fixed chain of line-level steps followed by the tree builder:
//! classify, erase opaque scopes, split header comments, group plain lines
//! into chunks, then build the tree by indentation.

use thiserror::Error;

use crate::ast::Root;
use crate::blocks::group_into_items;
use crate::comments::split_header_comments;
use crate::erase::erase_opaque_scopes;
use crate::lines::classify;
use crate::tree::TreeBuilder;

/// Errors that can occur during parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Leading whitespace contains a tab.
    #[error("line {line}: tab character in indentation:\n{text}")]
    TabIndent { line: u32, text: String },
    /// A top-level function would be collected by pytest as a test.
    #[error("line {line}: function needs to be renamed as pytest will think it's a test:\n{text}")]
    ReservedName { line: u32, text: String },
    /// A header-shaped line could not be parsed.
    #[error("line {line}: {reason}:\n{text}")]
    MalformedHeader {
        line: u32,
        reason: String,
        text: String,
    },
    /// A header that needs exactly one code block as body has something else.
    #[error("line {line}: `{text}` should have exactly one block of code as its body, found {found}")]
    BodyArity {
        line: u32,
        text: String,
        found: String,
    },
    /// A group header with nothing nested under it.
    #[error("line {line}: `{text}` has no body")]
    EmptyGroup { line: u32, text: String },
}

impl ParseError {
    /// 1-based source line the error points at.
    #[must_use]
    pub const fn line(&self) -> u32 {
        match self {
            Self::TabIndent { line, .. }
            | Self::ReservedName { line, .. }
            | Self::MalformedHeader { line, .. }
            | Self::BodyArity { line, .. }
            | Self::EmptyGroup { line, .. } => *line,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser for mamba spec files.
pub struct Parser<'a> {
    source: &'a str,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source text.
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Parse source text into a typed AST.
    pub fn parse(source: &str) -> ParseResult<Root> {
        Parser::new(source).parse_root()
    }

    /// Run every step on this parser's source.
    pub fn parse_root(&self) -> ParseResult<Root> {
        let lines = classify(self.source)?;
        let lines = erase_opaque_scopes(lines);
        let lines = split_header_comments(lines);
        let items = group_into_items(lines);
        TreeBuilder::new().build(items)
    }
}
