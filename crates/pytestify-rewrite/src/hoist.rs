//! Hoist helper methods into the per-example fixture.
//!
//! A `def helper(self, ...)` inside a mamba group is a closure over the shared
//! instance. In pytest it is declared inside the fixture and assigned onto the
//! instance copy, so examples can keep calling it as an attribute.

use pytestify_syntax::{Fixture, Group, Method, Node, Root, Scope};

/// Move each group's direct methods into its per-example fixture.
///
/// Without an existing per-example fixture one is created at the first
/// method's indentation, with a body one `indent_step` deeper. Methods land at
/// the fixture's body indentation and their bodies one step further.
#[must_use]
pub fn hoist(root: Root, indent_step: usize) -> Root {
    let children = root
        .children
        .into_iter()
        .map(|node| hoist_node(node, indent_step))
        .collect();
    Root::new(children)
}

fn hoist_node(node: Node, indent_step: usize) -> Node {
    match node {
        Node::Group(group) => Node::Group(hoist_group(group, indent_step)),
        node @ (Node::Code(_)
        | Node::Example(_)
        | Node::Setup(_)
        | Node::Teardown(_)
        | Node::Method(_)) => node,
    }
}

fn hoist_group(group: Group, indent_step: usize) -> Group {
    let mut methods: Vec<Method> = Vec::new();
    let mut children = Vec::with_capacity(group.children.len());
    for child in group.children {
        match child {
            Node::Method(method) => methods.push(method),
            node => children.push(hoist_node(node, indent_step)),
        }
    }

    let Some(first) = methods.first() else {
        return Group { children, ..group };
    };

    let (mut fixture, body_indent) = match group.example_fixture {
        Some(existing) => {
            let body_indent = existing.body_indent();
            (existing, body_indent)
        }
        None => (
            Fixture::new(Scope::PerExample, first.indent),
            first.indent + indent_step,
        ),
    };
    fixture
        .methods
        .extend(methods.iter().map(|method| method.reindent(body_indent, indent_step)));

    Group {
        example_fixture: Some(fixture),
        children,
        ..group
    }
}
