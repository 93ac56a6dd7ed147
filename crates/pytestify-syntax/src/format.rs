//! Serializer for converted trees.
//!
//! Groups become pytest classes, examples become `test_` methods and fixtures
//! become autouse pytest fixtures. Code chunks are written verbatim.

use serde::Deserialize;

use crate::ast::*;

/// Configuration for the serializer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Name of the per-example fixture that threads the shared instance
    /// (default: `mamba`).
    pub example_fixture: String,
    /// Name of the per-group fixture that threads the shared instance
    /// (default: `mamba_cls`).
    pub group_fixture: String,
    /// Prefix of fixtures that do not thread the instance; a counter is
    /// appended (default: `mamba_other`).
    pub other_fixture_prefix: String,
    /// pytest scope used for per-group fixtures (default: `class`).
    pub group_scope: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            example_fixture: "mamba".to_string(),
            group_fixture: "mamba_cls".to_string(),
            other_fixture_prefix: "mamba_other".to_string(),
            group_scope: "class".to_string(),
        }
    }
}

impl FormatConfig {
    /// Name of the fixture threading the instance for `scope`.
    #[must_use]
    pub fn fixture_name(&self, scope: Scope) -> &str {
        match scope {
            Scope::PerExample => &self.example_fixture,
            Scope::PerGroup => &self.group_fixture,
        }
    }
}

/// Hands out `mamba_other1`, `mamba_other2`, ... for one conversion.
#[derive(Debug, Clone)]
pub struct FixtureCounter {
    next: u32,
}

impl Default for FixtureCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FixtureCounter {
    /// A counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next unused name with `prefix`.
    pub fn next_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.next);
        self.next += 1;
        name
    }
}

/// Format a tree to a string.
#[must_use]
pub fn format(root: &Root, config: &FormatConfig) -> String {
    let mut formatter = Formatter::new(config);
    formatter.format_root(root);
    formatter.output
}

/// The internal formatter state.
struct Formatter<'a> {
    config: &'a FormatConfig,
    output: String,
    counter: FixtureCounter,
}

impl<'a> Formatter<'a> {
    fn new(config: &'a FormatConfig) -> Self {
        Self {
            config,
            output: String::new(),
            counter: FixtureCounter::new(),
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn writeln(&mut self, indent: usize, s: &str) {
        self.output.push_str(&" ".repeat(indent));
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn format_root(&mut self, root: &Root) {
        for child in &root.children {
            self.format_node(child);
        }
        if root.has_fixtures() {
            let at = future_imports_end(&self.output);
            self.output.insert_str(at, "import pytest\n");
        }
    }

    fn format_node(&mut self, node: &Node) {
        match node {
            Node::Code(chunk) => self.write(&chunk.text),
            Node::Group(group) => self.format_group(group),
            Node::Example(example) => self.format_example(example),
            // Only reachable for trees that skipped fixture combination.
            Node::Setup(hook) | Node::Teardown(hook) => self.write(&hook.body.text),
            Node::Method(method) => self.format_method(method),
        }
    }

    fn format_group(&mut self, group: &Group) {
        self.writeln(group.indent, &format!("class {}:", group.name));
        for fixture in group.fixtures() {
            self.format_fixture(fixture);
        }
        for child in &group.children {
            self.format_node(child);
        }
    }

    fn format_example(&mut self, example: &Example) {
        let signature = if example.takes_instance {
            format!("def {}(self, {}):", example.name, self.config.example_fixture)
        } else {
            format!("def {}(self):", example.name)
        };
        self.writeln(example.indent, &signature);
        self.write(&example.body.text);
    }

    fn format_method(&mut self, method: &Method) {
        self.writeln(method.indent, &method.header);
        self.write(&method.body.text);
    }

    fn format_fixture(&mut self, fixture: &Fixture) {
        let indent = fixture.indent;
        let body = fixture.body_indent();

        let decorator = match fixture.scope {
            Scope::PerExample => "@pytest.fixture(autouse=True)".to_string(),
            Scope::PerGroup => format!(
                "@pytest.fixture(autouse=True, scope=\"{}\")",
                self.config.group_scope
            ),
        };
        self.writeln(indent, &decorator);

        if fixture.threads_instance {
            let name = self.config.fixture_name(fixture.scope).to_string();
            self.writeln(indent, &format!("def {name}(self, {name}):"));
            self.writeln(body, &format!("{name} = {name}.copy()"));
            for method in &fixture.methods {
                self.format_method(method);
            }
            for method in &fixture.methods {
                self.writeln(body, &format!("{name}.{0} = {0}", method.name));
            }
            self.format_setup(fixture);
            self.writeln(body, &format!("yield {name}"));
        } else {
            let name = self.counter.next_name(&self.config.other_fixture_prefix);
            self.writeln(indent, &format!("def {name}(self):"));
            self.format_setup(fixture);
            if fixture.teardown.is_some() {
                self.writeln(body, "yield");
            }
        }

        match &fixture.teardown {
            Some(teardown) => self.write(&teardown.body.text),
            None => self.write("\n"),
        }
    }

    fn format_setup(&mut self, fixture: &Fixture) {
        if let Some(setup) = &fixture.setup {
            self.write(setup.body.text.trim_end_matches('\n'));
            self.write("\n");
        }
    }
}

/// Byte offset just past the module's leading `from __future__` imports.
///
/// Only blank lines and comments may precede them; `0` when there are none.
fn future_imports_end(text: &str) -> usize {
    let mut offset = 0;
    let mut end = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim();
        offset += line.len();
        if content.starts_with("from __future__ ") {
            end = offset;
        } else if !content.is_empty() && !content.starts_with('#') {
            break;
        }
    }
    end
}
