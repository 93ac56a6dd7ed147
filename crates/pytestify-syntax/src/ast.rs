//! Typed AST for mamba specs on their way to pytest.
//!
//! The tree builder produces these nodes and every rewrite pass consumes a
//! [`Root`] and returns a new one. Nodes are plain owned data; a pass that
//! wants to change a node builds a replacement.

use crate::span::Span;

/// Baseline of a chunk that holds no code at all (only blank or comment lines).
///
/// Such a chunk never constrains the block grouper and is always deeper than
/// any header it might follow.
pub const UNBOUNDED_INDENT: usize = usize::MAX;

// ============================================================================
// Root
// ============================================================================

/// The root of a converted file: its top-level nodes in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Root {
    /// Create a root from its children.
    #[must_use]
    pub const fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Whether any group in the tree carries a fixture.
    #[must_use]
    pub fn has_fixtures(&self) -> bool {
        self.children.iter().any(Node::has_fixtures)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Opaque lines copied through unchanged.
    Code(CodeChunk),
    /// A `with description/context/describe(...)` block.
    Group(Group),
    /// A `with it(...)` block.
    Example(Example),
    /// A `with before.each/all` block.
    Setup(Hook),
    /// A `with after.each/all` block.
    Teardown(Hook),
    /// A `def name(self, ...)` helper.
    Method(Method),
}

impl Node {
    /// Indentation of the node's first line.
    #[must_use]
    pub const fn indent(&self) -> usize {
        match self {
            Self::Code(chunk) => chunk.indent,
            Self::Group(group) => group.indent,
            Self::Example(example) => example.indent,
            Self::Setup(hook) | Self::Teardown(hook) => hook.indent,
            Self::Method(method) => method.indent,
        }
    }

    /// Source span of the node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Code(chunk) => chunk.span,
            Self::Group(group) => group.span,
            Self::Example(example) => example.span,
            Self::Setup(hook) | Self::Teardown(hook) => hook.span,
            Self::Method(method) => method.span,
        }
    }

    /// Short human name of the node kind, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Code(_) => "code block",
            Self::Group(_) => "group",
            Self::Example(_) => "example",
            Self::Setup(_) => "setup",
            Self::Teardown(_) => "teardown",
            Self::Method(_) => "method",
        }
    }

    fn has_fixtures(&self) -> bool {
        match self {
            Self::Group(group) => {
                group.fixtures().next().is_some() || group.children.iter().any(Self::has_fixtures)
            }
            Self::Code(_)
            | Self::Example(_)
            | Self::Setup(_)
            | Self::Teardown(_)
            | Self::Method(_) => false,
        }
    }
}

// ============================================================================
// Code
// ============================================================================

/// An opaque run of source lines with a baseline indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChunk {
    /// Indentation of the first line holding code, or [`UNBOUNDED_INDENT`].
    pub indent: usize,
    /// The lines, each terminated by `\n`.
    pub text: String,
    /// Source span.
    pub span: Span,
}

impl CodeChunk {
    /// Create a chunk.
    #[must_use]
    pub fn new(indent: usize, text: impl Into<String>, span: Span) -> Self {
        Self {
            indent,
            text: text.into(),
            span,
        }
    }

    /// Whether the chunk contains at least one line of code.
    #[must_use]
    pub const fn has_code(&self) -> bool {
        self.indent != UNBOUNDED_INDENT
    }

    /// A copy of this chunk with the same baseline and span but new text.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        Self {
            indent: self.indent,
            text,
            span: self.span,
        }
    }

    /// A copy shifted so its baseline sits at `indent`.
    ///
    /// Lines are moved by the difference between the old and new baseline;
    /// lines less indented than the old baseline lose only the indentation
    /// they have. Comments at column 0 are left in place, blank lines stay
    /// empty.
    #[must_use]
    pub fn reindent(&self, indent: usize) -> Self {
        let mut text = String::with_capacity(self.text.len());
        for line in self.text.lines() {
            if line.trim().is_empty() {
                text.push('\n');
                continue;
            }
            let line_indent = line.len() - line.trim_start_matches(' ').len();
            if line_indent == 0 && line.starts_with('#') {
                text.push_str(line);
            } else {
                let strip = self.indent.min(line_indent);
                text.push_str(&" ".repeat(indent));
                text.push_str(&line[strip..]);
            }
            text.push('\n');
        }
        Self {
            indent,
            text,
            span: self.span,
        }
    }
}

// ============================================================================
// Groups and examples
// ============================================================================

/// Stable identity of a group, assigned once by the tree builder.
///
/// Two groups with equal contents are still distinct groups; passes key
/// per-group data by this id rather than by structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named group of examples; becomes a pytest class.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Stable identity.
    pub id: GroupId,
    /// Class name, already converted (`TestSomething`).
    pub name: String,
    /// Indentation of the `with` line.
    pub indent: usize,
    /// Opened with `as self`: one instance is shared by the whole subtree.
    pub capturing: bool,
    /// Fixture running once per class.
    pub group_fixture: Option<Fixture>,
    /// Fixture running around every example.
    pub example_fixture: Option<Fixture>,
    /// Remaining children in source order.
    pub children: Vec<Node>,
    /// Source span of the header line.
    pub span: Span,
}

impl Group {
    /// The fixture for `scope`, if any.
    #[must_use]
    pub const fn fixture(&self, scope: Scope) -> Option<&Fixture> {
        match scope {
            Scope::PerGroup => self.group_fixture.as_ref(),
            Scope::PerExample => self.example_fixture.as_ref(),
        }
    }

    /// Fixtures in emission order: per-group first.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.group_fixture.iter().chain(self.example_fixture.iter())
    }
}

/// One test case; becomes a `test_` function.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Function name, already converted (`test_something`).
    pub name: String,
    /// Indentation of the `with` line.
    pub indent: usize,
    /// The test body.
    pub body: CodeChunk,
    /// The body reads the per-example fixture value after rewriting.
    pub takes_instance: bool,
    /// Source span of the header line.
    pub span: Span,
}

// ============================================================================
// Fixtures
// ============================================================================

/// When a setup, teardown or fixture runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Around every example (`before.each`, `after.each`).
    PerExample,
    /// Once per group (`before.all`, `after.all`).
    PerGroup,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerExample => write!(f, "each"),
            Self::PerGroup => write!(f, "all"),
        }
    }
}

/// A `before.*` or `after.*` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Hook {
    /// When the hook runs.
    pub scope: Scope,
    /// Indentation of the `with` line.
    pub indent: usize,
    /// The hook body.
    pub body: CodeChunk,
    /// Source span of the header line.
    pub span: Span,
}

/// A helper `def name(self, ...)` declared inside a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Function name.
    pub name: String,
    /// Indentation of the `def` line.
    pub indent: usize,
    /// The `def` line without indentation or newline.
    pub header: String,
    /// The function body.
    pub body: CodeChunk,
    /// Source span of the `def` line.
    pub span: Span,
}

impl Method {
    /// A copy placed at `indent`, with its body one `step` deeper.
    #[must_use]
    pub fn reindent(&self, indent: usize, step: usize) -> Self {
        Self {
            name: self.name.clone(),
            indent,
            header: self.header.clone(),
            body: self.body.reindent(indent + step),
            span: self.span,
        }
    }
}

/// Setup, teardown and hoisted methods of one scope, merged into one
/// autouse pytest fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    /// When the fixture runs.
    pub scope: Scope,
    /// Indentation of the decorator and `def` line.
    pub indent: usize,
    /// Code before `yield`.
    pub setup: Option<Hook>,
    /// Code after `yield`.
    pub teardown: Option<Hook>,
    /// Helpers bound onto the shared instance. Always empty for per-group scope.
    pub methods: Vec<Method>,
    /// The fixture receives, copies and yields the shared instance.
    pub threads_instance: bool,
}

impl Fixture {
    /// An empty fixture to be filled by the passes.
    #[must_use]
    pub const fn new(scope: Scope, indent: usize) -> Self {
        Self {
            scope,
            indent,
            setup: None,
            teardown: None,
            methods: Vec::new(),
            threads_instance: false,
        }
    }

    /// Indentation of the fixture's body lines.
    #[must_use]
    pub fn body_indent(&self) -> usize {
        self.setup
            .as_ref()
            .or(self.teardown.as_ref())
            .map(|hook| hook.body.indent)
            .or_else(|| self.methods.first().map(|method| method.indent))
            .unwrap_or(self.indent)
    }

    /// Whether nothing has been merged into the fixture yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setup.is_none() && self.teardown.is_none() && self.methods.is_empty()
    }
}
