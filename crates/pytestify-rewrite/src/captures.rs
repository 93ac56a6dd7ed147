//! Capture sets: which `self.<name>` attributes an `as self` group shares.
//!
//! This is the first half of instance resolution. The sets are built once
//! for the whole tree and then only read by [`crate::resolve`].

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use pytestify_syntax::{CodeChunk, Fixture, Group, GroupId, Node, Root};
use regex::Regex;
use tracing::warn;

use crate::diagnostics::{Warning, WarningKind};

/// `self.<name> =` that is not `==`.
static ATTRIBUTE_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)\bself\.(\w+)\s*=(?:[^=]|$)").unwrap());

/// Attribute and method names shared through one group's instance.
pub type CaptureSet = BTreeSet<String>;

/// Capture sets of every `as self` group that shares at least one name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSets {
    sets: HashMap<GroupId, CaptureSet>,
}

impl CaptureSets {
    /// The capture set of `group`, if it has a non-empty one.
    #[must_use]
    pub fn get(&self, group: GroupId) -> Option<&CaptureSet> {
        self.sets.get(&group)
    }

    /// Number of groups with a capture set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no group captures anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Build the capture set of every outermost `as self` group.
///
/// An `as self` group nested inside another is reported as a warning and
/// not walked: assignments inside it are not shared, while its bodies still
/// see the outer group's names.
pub fn collect_captures(root: &Root, warnings: &mut Vec<Warning>) -> CaptureSets {
    let mut collector = Collector {
        sets: HashMap::new(),
        warnings,
    };
    for child in &root.children {
        collector.visit(child);
    }
    CaptureSets {
        sets: collector.sets,
    }
}

struct Collector<'w> {
    sets: HashMap<GroupId, CaptureSet>,
    warnings: &'w mut Vec<Warning>,
}

impl Collector<'_> {
    /// Walk outside of any capturing group.
    fn visit(&mut self, node: &Node) {
        match node {
            Node::Group(group) if group.capturing => {
                let mut set = CaptureSet::new();
                self.gather_group(group, &mut set);
                if !set.is_empty() {
                    self.sets.insert(group.id, set);
                }
            }
            Node::Group(group) => {
                for child in &group.children {
                    self.visit(child);
                }
            }
            Node::Code(_)
            | Node::Example(_)
            | Node::Setup(_)
            | Node::Teardown(_)
            | Node::Method(_) => {}
        }
    }

    fn gather_group(&mut self, group: &Group, set: &mut CaptureSet) {
        for fixture in group.fixtures() {
            gather_fixture(fixture, set);
        }
        for child in &group.children {
            self.gather_node(child, set);
        }
    }

    fn gather_node(&mut self, node: &Node, set: &mut CaptureSet) {
        match node {
            Node::Code(chunk) => gather_chunk(chunk, set),
            Node::Example(example) => gather_chunk(&example.body, set),
            Node::Setup(hook) | Node::Teardown(hook) => gather_chunk(&hook.body, set),
            Node::Method(method) => {
                set.insert(method.name.clone());
                gather_chunk(&method.body, set);
            }
            Node::Group(group) if group.capturing => {
                warn!(group = %group.name, span = %group.span, "ignoring nested `as self`");
                self.warnings.push(Warning {
                    kind: WarningKind::NestedCapture,
                    message: format!(
                        "ignoring nested `as self` of {}, its assignments are not shared",
                        group.name
                    ),
                    span: group.span,
                });
            }
            Node::Group(group) => self.gather_group(group, set),
        }
    }
}

fn gather_fixture(fixture: &Fixture, set: &mut CaptureSet) {
    for hook in fixture.setup.iter().chain(fixture.teardown.iter()) {
        gather_chunk(&hook.body, set);
    }
    for method in &fixture.methods {
        set.insert(method.name.clone());
        gather_chunk(&method.body, set);
    }
}

fn gather_chunk(chunk: &CodeChunk, set: &mut CaptureSet) {
    let text = chunk.text.as_str();
    for caps in ATTRIBUTE_ASSIGNMENT.captures_iter(text) {
        // `obj.self.x = 1` assigns to another object.
        let after_dot = caps
            .get(0)
            .is_some_and(|m| text[..m.start()].ends_with('.'));
        if !after_dot {
            set.insert(caps[1].to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytestify_syntax::{Example, Hook, Method, Scope, Span};

    fn code(text: &str) -> Node {
        Node::Code(CodeChunk::new(4, text, Span::dummy()))
    }

    fn group(id: u32, capturing: bool, children: Vec<Node>) -> Group {
        Group {
            id: GroupId(id),
            name: format!("TestG{id}"),
            indent: 0,
            capturing,
            group_fixture: None,
            example_fixture: None,
            children,
            span: Span::line(id + 1),
        }
    }

    fn names(set: &CaptureSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_assignments_are_captured() {
        let root = Root::new(vec![Node::Group(group(
            0,
            true,
            vec![code("    self.x = 1\n    self.y=2\n    self.ignore_me # =\n    self.z == 3\n    self.w += 1\n")],
        ))]);
        let captures = collect_captures(&root, &mut Vec::new());
        assert_eq!(names(captures.get(GroupId(0)).unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_assignment_at_end_of_text() {
        let mut set = CaptureSet::new();
        gather_chunk(&CodeChunk::new(0, "self.last =", Span::dummy()), &mut set);
        assert!(set.contains("last"));
    }

    #[test]
    fn test_non_capturing_groups_have_no_set() {
        let root = Root::new(vec![Node::Group(group(0, false, vec![code("    self.x = 1\n")]))]);
        let captures = collect_captures(&root, &mut Vec::new());
        assert!(captures.is_empty());
    }

    #[test]
    fn test_empty_capture_set_is_dropped() {
        let root = Root::new(vec![Node::Group(group(0, true, vec![code("    pass\n")]))]);
        assert!(collect_captures(&root, &mut Vec::new()).get(GroupId(0)).is_none());
    }

    #[test]
    fn test_fixture_bodies_and_methods_are_scanned() {
        let mut g = group(0, true, vec![]);
        let mut fixture = Fixture::new(Scope::PerExample, 2);
        fixture.setup = Some(Hook {
            scope: Scope::PerExample,
            indent: 2,
            body: CodeChunk::new(4, "    self.setup_value = 1\n", Span::dummy()),
            span: Span::dummy(),
        });
        fixture.methods.push(Method {
            name: "helper".to_string(),
            indent: 4,
            header: "def helper(self):".to_string(),
            body: CodeChunk::new(8, "        self.from_method = 2\n", Span::dummy()),
            span: Span::dummy(),
        });
        g.example_fixture = Some(fixture);
        g.children.push(Node::Example(Example {
            name: "test_a".to_string(),
            indent: 2,
            body: CodeChunk::new(4, "    self.in_example = 3\n", Span::dummy()),
            takes_instance: false,
            span: Span::dummy(),
        }));

        let captures = collect_captures(&Root::new(vec![Node::Group(g)]), &mut Vec::new());
        assert_eq!(
            names(captures.get(GroupId(0)).unwrap()),
            vec!["from_method", "helper", "in_example", "setup_value"]
        );
    }

    #[test]
    fn test_assignment_on_other_object_is_not_captured() {
        let mut set = CaptureSet::new();
        gather_chunk(&CodeChunk::new(0, "obj.self.x = 1\nself.y = 2\n", Span::dummy()), &mut set);
        assert_eq!(names(&set), vec!["y"]);
    }

    #[test]
    fn test_nested_capture_warns_and_is_not_collected() {
        let inner = group(1, true, vec![code("    self.inner = 1\n")]);
        let outer = group(0, true, vec![code("    self.outer = 1\n"), Node::Group(inner)]);
        let mut warnings = Vec::new();
        let captures = collect_captures(&Root::new(vec![Node::Group(outer)]), &mut warnings);

        assert_eq!(names(captures.get(GroupId(0)).unwrap()), vec!["outer"]);
        assert!(captures.get(GroupId(1)).is_none());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::NestedCapture);
        assert_eq!(warnings[0].span, Span::line(2));
    }

    #[test]
    fn test_capture_below_plain_group() {
        let inner = group(1, true, vec![code("    self.x = 1\n")]);
        let outer = group(0, false, vec![Node::Group(inner)]);
        let captures = collect_captures(&Root::new(vec![Node::Group(outer)]), &mut Vec::new());
        assert_eq!(captures.len(), 1);
        assert!(captures.get(GroupId(1)).is_some());
    }

    #[test]
    fn test_equal_groups_keep_separate_sets() {
        let first = group(0, true, vec![code("    self.x = 1\n")]);
        let second = Group {
            id: GroupId(1),
            ..first.clone()
        };
        let captures =
            collect_captures(&Root::new(vec![Node::Group(first), Node::Group(second)]), &mut Vec::new());
        assert_eq!(captures.len(), 2);
    }
}
