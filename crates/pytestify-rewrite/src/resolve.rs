//! Resolve instance references.
//!
//! Inside an `as self` group, mamba shares one instance across setup,
//! helpers and examples through `self`. In pytest, `self` is a fresh class
//! instance per test, so the shared state travels through a fixture value
//! instead. This pass rewrites the text of every body below a capturing group:
//!
//! - `self.<captured>` and a bare `self` become the fixture name
//! - `self.<method>(args)` becomes `<fixture>.<method>(<fixture>, args)`
//! - `def <method>(self, ...)` becomes `def <method>(<fixture>, ...)`
//!
//! The substitution is textual with word boundaries; strings and comments
//! are rewritten just like code.

use once_cell::sync::Lazy;
use pytestify_syntax::{CodeChunk, Example, Fixture, FormatConfig, Group, Hook, Method, Node, Root, Scope};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::captures::{CaptureSet, CaptureSets};
use crate::diagnostics::{Warning, WarningKind};

static METHOD_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bself\.(\w+)\(\s*(\))?").unwrap());
static INSTANCE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bself\b(?:\.(\w+))?").unwrap());
static SELF_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bself\b").unwrap());

/// Rewrite every instance reference below a group with a capture set.
///
/// Hoisted methods called from a per-group hook are reported to `warnings`:
/// they are only bound onto the per-example copy.
pub fn resolve(
    root: Root,
    captures: &CaptureSets,
    names: &FormatConfig,
    warnings: &mut Vec<Warning>,
) -> Root {
    let mut resolver = Resolver {
        captures,
        names,
        warnings,
    };
    let env = Env::default();
    let children = root
        .children
        .into_iter()
        .map(|node| resolver.node(node, &env))
        .collect();
    Root::new(children)
}

/// What is in scope at a point of the tree.
#[derive(Debug, Clone, Default)]
struct Env<'a> {
    /// Names shared by the enclosing capturing group.
    captured: Option<&'a CaptureSet>,
    /// Hoisted methods of this group and its ancestors.
    methods: Vec<String>,
}

/// How much of `self` a body may keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Only captured attributes and bare `self` move to the fixture;
    /// `self` is still the test class instance.
    Captured,
    /// Every `self` moves: the body belongs to a hoisted method whose
    /// `self` parameter was renamed.
    Everything,
}

struct Resolver<'a, 'w> {
    captures: &'a CaptureSets,
    names: &'a FormatConfig,
    warnings: &'w mut Vec<Warning>,
}

impl<'a> Resolver<'a, '_> {
    fn node(&mut self, node: Node, env: &Env<'a>) -> Node {
        match node {
            Node::Group(group) => Node::Group(self.group(group, env)),
            Node::Code(chunk) => Node::Code(self.chunk(&chunk, Scope::PerExample, env, Mode::Captured).0),
            Node::Example(example) => Node::Example(self.example(example, env)),
            Node::Setup(hook) => Node::Setup(self.hook(hook, env).0),
            Node::Teardown(hook) => Node::Teardown(self.hook(hook, env).0),
            Node::Method(method) => Node::Method(self.method(method, env)),
        }
    }

    fn group(&mut self, group: Group, outer: &Env<'a>) -> Group {
        let mut env = outer.clone();
        let captures = self.captures;
        if let Some(set) = captures.get(group.id) {
            debug!(group = %group.name, captured = set.len(), "resolving instance references");
            env.captured = Some(set);
        }
        if let Some(fixture) = &group.example_fixture {
            env.methods
                .extend(fixture.methods.iter().map(|method| method.name.clone()));
        }

        let group_fixture = group.group_fixture.map(|fixture| self.fixture(fixture, &env));
        let example_fixture = group.example_fixture.map(|fixture| self.fixture(fixture, &env));
        let children = group
            .children
            .into_iter()
            .map(|node| self.node(node, &env))
            .collect();

        Group {
            group_fixture,
            example_fixture,
            children,
            ..group
        }
    }

    fn fixture(&mut self, fixture: Fixture, env: &Env<'a>) -> Fixture {
        let mut changed = false;
        let mut rewrite_hook = |hook: Option<Hook>| {
            hook.map(|hook| {
                let (hook, hook_changed) = self.hook(hook, env);
                changed |= hook_changed;
                hook
            })
        };
        let setup = rewrite_hook(fixture.setup);
        let teardown = rewrite_hook(fixture.teardown);
        let methods: Vec<Method> = fixture
            .methods
            .into_iter()
            .map(|method| self.method(method, env))
            .collect();

        Fixture {
            threads_instance: changed || !methods.is_empty(),
            setup,
            teardown,
            methods,
            ..fixture
        }
    }

    fn hook(&mut self, hook: Hook, env: &Env<'a>) -> (Hook, bool) {
        if hook.scope == Scope::PerGroup && env.captured.is_some() {
            for name in method_calls(&hook.body.text, &env.methods) {
                warn!(method = %name, span = %hook.span, "method called from a per-group hook");
                self.warnings.push(Warning {
                    kind: WarningKind::GroupScopeMethodCall,
                    message: format!(
                        "`{name}` is only bound per example, calling it from a `before.all` or `after.all` fails"
                    ),
                    span: hook.span,
                });
            }
        }
        let (body, changed) = self.chunk(&hook.body, hook.scope, env, Mode::Captured);
        (Hook { body, ..hook }, changed)
    }

    fn example(&mut self, example: Example, env: &Env<'a>) -> Example {
        let (body, changed) = self.chunk(&example.body, Scope::PerExample, env, Mode::Captured);
        Example {
            body,
            takes_instance: example.takes_instance || changed,
            ..example
        }
    }

    fn method(&mut self, method: Method, env: &Env<'a>) -> Method {
        if env.captured.is_none() {
            return method;
        }
        let fixture = self.names.fixture_name(Scope::PerExample);
        let header = SELF_WORD.replace_all(&method.header, fixture).into_owned();
        let (body, _) = self.chunk(&method.body, Scope::PerExample, env, Mode::Everything);
        Method {
            header,
            body,
            ..method
        }
    }

    /// Rewrite one body for `scope`; reports whether anything changed.
    fn chunk(&self, chunk: &CodeChunk, scope: Scope, env: &Env<'a>, mode: Mode) -> (CodeChunk, bool) {
        let Some(captured) = env.captured else {
            return (chunk.clone(), false);
        };
        let fixture = self.names.fixture_name(scope);
        let text = rewrite(&chunk.text, fixture, captured, &env.methods, mode);
        let changed = text != chunk.text;
        (chunk.with_text(text), changed)
    }
}

/// Hoisted methods called through `self` in `text`, in order of appearance.
fn method_calls(text: &str, methods: &[String]) -> Vec<String> {
    METHOD_CALL
        .captures_iter(text)
        .filter(|caps| !follows_dot(text, caps))
        .map(|caps| caps[1].to_string())
        .filter(|name| methods.contains(name))
        .collect()
}

/// Rewrite `self` references in `text` against `fixture`.
fn rewrite(text: &str, fixture: &str, captured: &CaptureSet, methods: &[String], mode: Mode) -> String {
    let text = METHOD_CALL.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        if follows_dot(text, caps) || !methods.iter().any(|method| method == name) {
            return caps[0].to_string();
        }
        if caps.get(2).is_some() {
            format!("{fixture}.{name}({fixture})")
        } else {
            format!("{fixture}.{name}({fixture}, ")
        }
    });

    INSTANCE_REF
        .replace_all(&text, |caps: &Captures| {
            if follows_dot(&text, caps) {
                return caps[0].to_string();
            }
            match caps.get(1) {
                Some(attribute) if mode == Mode::Everything || captured.contains(attribute.as_str()) => {
                    format!("{fixture}.{}", attribute.as_str())
                }
                Some(_) => caps[0].to_string(),
                None => fixture.to_string(),
            }
        })
        .into_owned()
}

/// `obj.self` is an attribute called `self`, not the instance.
fn follows_dot(text: &str, caps: &Captures) -> bool {
    caps.get(0)
        .is_some_and(|m| text[..m.start()].ends_with('.'))
}
