//! Errors raised by the rewrite passes and by the conversion as a whole.

use pytestify_syntax::{ParseError, Scope, Span};
use thiserror::Error;

/// A tree that cannot be expressed as pytest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// Two setups or two teardowns of the same scope in one group.
    #[error("{span}: duplicate {kind} for scope `{scope}` in {group}")]
    DuplicateHook {
        group: String,
        kind: &'static str,
        scope: Scope,
        span: Span,
    },
    /// Two siblings would become pytest items with the same name.
    #[error("{span}: ended up with duplicate pytest name, please rename it in the mamba file: {name}")]
    DuplicateName { name: String, span: Span },
    /// A helper method that no `as self` group encloses.
    #[error("{span}: methods outside a `with ... as self:` context are unsupported: {name}")]
    MethodOutsideCapture { name: String, span: Span },
    /// A setup or teardown at top level.
    #[error("{span}: {kind} must be nested inside a description or context")]
    HookOutsideGroup { kind: &'static str, span: Span },
}

/// Result type for rewrite passes.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Any failure while converting one file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The source could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed tree could not be rewritten.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}
