//! Combine `before.*` and `after.*` blocks into fixtures.

use pytestify_syntax::{Fixture, Group, Hook, Node, Root, Scope};

use crate::error::{RewriteError, RewriteResult};

/// Merge each group's setups and teardowns into one fixture per scope.
///
/// The per-group fixture comes first. A second setup or teardown of the same
/// scope in one group is an error, as is a setup or teardown at top level.
pub fn combine(root: Root) -> RewriteResult<Root> {
    let children = root
        .children
        .into_iter()
        .map(combine_node)
        .collect::<RewriteResult<Vec<_>>>()?;
    Ok(Root::new(children))
}

fn combine_node(node: Node) -> RewriteResult<Node> {
    match node {
        Node::Group(group) => combine_group(group).map(Node::Group),
        Node::Setup(hook) => Err(RewriteError::HookOutsideGroup {
            kind: "setup",
            span: hook.span,
        }),
        Node::Teardown(hook) => Err(RewriteError::HookOutsideGroup {
            kind: "teardown",
            span: hook.span,
        }),
        node @ (Node::Code(_) | Node::Example(_) | Node::Method(_)) => Ok(node),
    }
}

/// Setup and teardown of one scope, as found so far.
#[derive(Default)]
struct Hooks {
    setup: Option<Hook>,
    teardown: Option<Hook>,
}

impl Hooks {
    fn into_fixture(self, scope: Scope) -> Option<Fixture> {
        let indent = self.setup.as_ref().or(self.teardown.as_ref())?.indent;
        let teardown = match (&self.setup, self.teardown) {
            (Some(setup), Some(teardown)) if teardown.body.indent != setup.body.indent => Some(Hook {
                indent: setup.indent,
                body: teardown.body.reindent(setup.body.indent),
                ..teardown
            }),
            (_, teardown) => teardown,
        };
        Some(Fixture {
            setup: self.setup,
            teardown,
            ..Fixture::new(scope, indent)
        })
    }
}

fn combine_group(group: Group) -> RewriteResult<Group> {
    let mut per_group = Hooks::default();
    let mut per_example = Hooks::default();
    let mut children = Vec::with_capacity(group.children.len());

    for child in group.children {
        match child {
            Node::Setup(hook) => {
                let hooks = match hook.scope {
                    Scope::PerGroup => &mut per_group,
                    Scope::PerExample => &mut per_example,
                };
                if hooks.setup.is_some() {
                    return Err(duplicate(&group.name, "setup", &hook));
                }
                hooks.setup = Some(hook);
            }
            Node::Teardown(hook) => {
                let hooks = match hook.scope {
                    Scope::PerGroup => &mut per_group,
                    Scope::PerExample => &mut per_example,
                };
                if hooks.teardown.is_some() {
                    return Err(duplicate(&group.name, "teardown", &hook));
                }
                hooks.teardown = Some(hook);
            }
            Node::Group(inner) => children.push(Node::Group(combine_group(inner)?)),
            node @ (Node::Code(_) | Node::Example(_) | Node::Method(_)) => children.push(node),
        }
    }

    Ok(Group {
        group_fixture: per_group.into_fixture(Scope::PerGroup).or(group.group_fixture),
        example_fixture: per_example
            .into_fixture(Scope::PerExample)
            .or(group.example_fixture),
        children,
        ..group
    })
}

fn duplicate(group: &str, kind: &'static str, hook: &Hook) -> RewriteError {
    RewriteError::DuplicateHook {
        group: group.to_string(),
        kind,
        scope: hook.scope,
        span: hook.span,
    }
}
