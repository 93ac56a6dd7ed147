//! Tree construction by the off-side rule.
//!
//! A header owns every following item that is indented deeper than itself.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::ast::{CodeChunk, Example, Group, GroupId, Hook, Method, Node, Root};
use crate::blocks::Item;
use crate::lines::{Header, HeaderKind, SourceLine};
use crate::names;
use crate::parser::{ParseError, ParseResult};

type Items = Peekable<IntoIter<Item>>;

/// Builds the tree and hands out group ids in document order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    next_group: u32,
}

impl TreeBuilder {
    /// Create a builder whose first group gets id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree for a grouped item stream.
    pub fn build(mut self, items: Vec<Item>) -> ParseResult<Root> {
        let mut items = items.into_iter().peekable();
        let children = self.children(&mut items, None)?;
        Ok(Root::new(children))
    }

    fn children(&mut self, items: &mut Items, parent: Option<usize>) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        while let Some(item) = items.next_if(|item| parent.is_none_or(|indent| item.indent() > indent)) {
            nodes.push(self.node(item, items)?);
        }
        Ok(nodes)
    }

    fn node(&mut self, item: Item, items: &mut Items) -> ParseResult<Node> {
        match item {
            Item::Chunk(chunk) => Ok(Node::Code(chunk)),
            Item::Header(header) => {
                let children = self.children(items, Some(header.line.indent))?;
                self.header_node(header, children)
            }
            Item::Method(method) => {
                let children = self.children(items, Some(method.line.indent))?;
                let body = single_body(&method.line, children)?;
                Ok(Node::Method(Method {
                    name: method.name,
                    indent: method.line.indent,
                    header: method.line.content().to_string(),
                    body,
                    span: method.line.span(),
                }))
            }
        }
    }

    fn header_node(&mut self, header: Header, children: Vec<Node>) -> ParseResult<Node> {
        let line = header.line;
        let title = header.title.unwrap_or_default();
        match header.kind {
            HeaderKind::Group => {
                if children.is_empty() {
                    return Err(ParseError::EmptyGroup {
                        line: line.number,
                        text: line.content().to_string(),
                    });
                }
                let id = GroupId(self.next_group);
                self.next_group += 1;
                Ok(Node::Group(Group {
                    id,
                    name: names::class_name(&title),
                    indent: line.indent,
                    capturing: header.capturing,
                    group_fixture: None,
                    example_fixture: None,
                    children,
                    span: line.span(),
                }))
            }
            HeaderKind::Example => Ok(Node::Example(Example {
                name: names::example_name(&title),
                indent: line.indent,
                body: single_body(&line, children)?,
                takes_instance: false,
                span: line.span(),
            })),
            HeaderKind::Setup(scope) => Ok(Node::Setup(Hook {
                scope,
                indent: line.indent,
                body: single_body(&line, children)?,
                span: line.span(),
            })),
            HeaderKind::Teardown(scope) => Ok(Node::Teardown(Hook {
                scope,
                indent: line.indent,
                body: single_body(&line, children)?,
                span: line.span(),
            })),
        }
    }
}

/// Take the only child of a header that needs exactly one body chunk.
fn single_body(line: &SourceLine, mut children: Vec<Node>) -> ParseResult<CodeChunk> {
    let is_body = matches!(children.as_slice(), [Node::Code(chunk)] if chunk.has_code());
    if is_body {
        if let Some(Node::Code(chunk)) = children.pop() {
            return Ok(chunk);
        }
    }
    Err(ParseError::BodyArity {
        line: line.number,
        text: line.content().to_string(),
        found: describe(&children),
    })
}

fn describe(children: &[Node]) -> String {
    match children {
        [] => "nothing".to_string(),
        [Node::Code(chunk)] if !chunk.has_code() => "only blank lines and comments".to_string(),
        _ => children
            .iter()
            .map(|child| format!("{} at {}", child.kind(), child.span()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
