//! Non-fatal findings reported alongside a successful conversion.

use pytestify_syntax::Span;

/// A warning about the converted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The warning kind.
    pub kind: WarningKind,
    /// The message.
    pub message: String,
    /// Source location.
    pub span: Span,
}

/// Kind of warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An `as self` group inside another one; only the outer one threads the
    /// instance.
    NestedCapture,
    /// A hoisted method called from a per-group hook, where it is not bound.
    GroupScopeMethodCall,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}
