//! Mamba spec parsing, typed AST and pytest serialization.
//!
//! This crate provides:
//! - A line classifier and off-side-rule tree builder for mamba specs
//! - A typed AST of groups, examples, hooks, helper methods and fixtures
//! - The pytest naming conventions
//! - A serializer that writes a (rewritten) tree as a pytest module
//!
//! # Example
//!
//! ```
//! use pytestify_syntax::{format, FormatConfig, Node, Parser};
//!
//! let source = "with description('A'):\n  with it('b'):\n    pass\n";
//!
//! let root = Parser::parse(source).unwrap();
//! assert!(matches!(&root.children[0], Node::Group(group) if group.name == "TestA"));
//!
//! let output = format(&root, &FormatConfig::default());
//! assert_eq!(output, "class TestA:\n  def test_b(self):\n    pass\n");
//! ```

pub mod ast;
pub mod blocks;
pub mod comments;
pub mod erase;
pub mod format;
pub mod lines;
pub mod names;
pub mod parser;
pub mod span;
pub mod tree;

#[cfg(test)]
mod proptest_support;

pub use ast::*;
pub use format::{format, FixtureCounter, FormatConfig};
pub use parser::{ParseError, ParseResult, Parser};
pub use span::Span;
