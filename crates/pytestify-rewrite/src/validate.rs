//! Checks that must hold before instance references are rewritten.

use std::collections::HashSet;

use pytestify_syntax::{Method, Node, Root};

use crate::error::{RewriteError, RewriteResult};

/// Reject sibling name clashes and methods outside any `as self` group.
pub fn validate(root: &Root) -> RewriteResult<()> {
    check_unique_names(&root.children)?;
    root.children
        .iter()
        .try_for_each(|child| validate_node(child, false))
}

fn validate_node(node: &Node, in_capture: bool) -> RewriteResult<()> {
    match node {
        Node::Group(group) => {
            let in_capture = in_capture || group.capturing;
            for fixture in group.fixtures() {
                fixture
                    .methods
                    .iter()
                    .try_for_each(|method| check_method(method, in_capture))?;
            }
            check_unique_names(&group.children)?;
            group
                .children
                .iter()
                .try_for_each(|child| validate_node(child, in_capture))
        }
        Node::Method(method) => check_method(method, in_capture),
        Node::Code(_) | Node::Example(_) | Node::Setup(_) | Node::Teardown(_) => Ok(()),
    }
}

fn check_method(method: &Method, in_capture: bool) -> RewriteResult<()> {
    if in_capture {
        Ok(())
    } else {
        Err(RewriteError::MethodOutsideCapture {
            name: method.name.clone(),
            span: method.span,
        })
    }
}

/// Classes and test functions share one namespace per parent.
fn check_unique_names(children: &[Node]) -> RewriteResult<()> {
    let mut seen = HashSet::new();
    for child in children {
        let name = match child {
            Node::Group(group) => &group.name,
            Node::Example(example) => &example.name,
            Node::Code(_) | Node::Setup(_) | Node::Teardown(_) | Node::Method(_) => continue,
        };
        if !seen.insert(name.as_str()) {
            return Err(RewriteError::DuplicateName {
                name: name.clone(),
                span: child.span(),
            });
        }
    }
    Ok(())
}
