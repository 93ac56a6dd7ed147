//! Flatten singleton groups.
//!
//! `with context('when empty'): with it('returns none'): ...` needs no class of
//! its own in pytest; it becomes `test_when_empty_returns_none` in the parent.

use pytestify_syntax::names::prefixed_example_name;
use pytestify_syntax::{Example, Group, Node, Root};
use tracing::debug;

/// Collapse every non-top-level group whose only child is an example.
///
/// Runs depth-first, so a chain of singleton groups collapses into one
/// example named after every group on the way.
#[must_use]
pub fn flatten(root: Root) -> Root {
    let children = root
        .children
        .into_iter()
        .map(|node| flatten_node(node, true))
        .collect();
    Root::new(children)
}

fn flatten_node(node: Node, top_level: bool) -> Node {
    match node {
        Node::Group(group) => flatten_group(group, top_level),
        node @ (Node::Code(_)
        | Node::Example(_)
        | Node::Setup(_)
        | Node::Teardown(_)
        | Node::Method(_)) => node,
    }
}

fn flatten_group(group: Group, top_level: bool) -> Node {
    let mut children: Vec<Node> = group
        .children
        .into_iter()
        .map(|node| flatten_node(node, false))
        .collect();

    let singleton = !top_level && matches!(children.as_slice(), [Node::Example(_)]);
    if singleton {
        if let Some(Node::Example(example)) = children.pop() {
            debug!(group = %group.name, example = %example.name, "flattening singleton group");
            return Node::Example(merge(&group.name, group.indent, example));
        }
    }

    Node::Group(Group { children, ..group })
}

/// The example takes the group's place; its body moves to where the
/// example's own header used to be.
fn merge(group_name: &str, group_indent: usize, example: Example) -> Example {
    Example {
        name: prefixed_example_name(group_name, &example.name),
        indent: group_indent,
        body: example.body.reindent(example.indent),
        takes_instance: example.takes_instance,
        span: example.span,
    }
}
