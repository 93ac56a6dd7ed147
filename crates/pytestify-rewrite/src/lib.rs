//! Tree passes that turn a parsed mamba spec into a pytest module.
//!
//! The passes run in a fixed order, each consuming the tree of the previous:
//!
//! 1. [`flatten`] folds groups holding a single example into that example
//! 2. [`combine`] merges setup and teardown hooks into fixtures
//! 3. [`hoist`] moves helper methods into the per-example fixture
//! 4. [`validate`] rejects name clashes and stray methods
//! 5. [`collect_captures`] and [`resolve`] thread the shared `as self`
//!    instance through fixture values
//!
//! [`convert`] runs the whole pipeline, from source text to pytest text.
//!
//! # Example
//!
//! ```
//! use pytestify_rewrite::{convert, ConvertConfig};
//!
//! let source = "with description('A'):\n  with it('b'):\n    pass\n";
//! let conversion = convert(source, &ConvertConfig::default()).unwrap();
//! assert_eq!(conversion.output, "class TestA:\n  def test_b(self):\n    pass\n");
//! assert!(conversion.warnings.is_empty());
//! ```

pub mod captures;
pub mod combine;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flatten;
pub mod hoist;
pub mod resolve;
pub mod validate;

pub use captures::{collect_captures, CaptureSet, CaptureSets};
pub use combine::combine;
pub use config::ConvertConfig;
pub use diagnostics::{Warning, WarningKind};
pub use error::{ConvertError, RewriteError, RewriteResult};
pub use flatten::flatten;
pub use hoist::hoist;
pub use resolve::resolve;
pub use validate::validate;

use pytestify_syntax::{format, Parser};
use tracing::debug;

/// The result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The pytest module text.
    pub output: String,
    /// Findings that did not stop the conversion.
    pub warnings: Vec<Warning>,
}

/// Convert mamba source text to pytest source text.
///
/// Nothing is written anywhere; a failure leaves no partial output.
pub fn convert(source: &str, config: &ConvertConfig) -> Result<Conversion, ConvertError> {
    let root = Parser::parse(source)?;
    debug!(nodes = root.children.len(), "parsed");

    let root = flatten(root);
    let root = combine(root)?;
    let root = hoist(root, config.indent_step);
    validate(&root)?;

    let mut warnings = Vec::new();
    let captures = collect_captures(&root, &mut warnings);
    debug!(groups = captures.len(), "collected capture sets");
    let root = resolve(root, &captures, &config.fixtures, &mut warnings);

    Ok(Conversion {
        output: format(&root, &config.fixtures),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytestify_syntax::{ParseError, Span};

    fn converted(source: &str) -> String {
        convert(source, &ConvertConfig::default())
            .expect("conversion failed")
            .output
    }

    #[test]
    fn test_simple_description() {
        insta::assert_snapshot!(converted("with description('A'):\n  with it('b'):\n    pass\n"), @r#"
class TestA:
  def test_b(self):
    pass
"#);
    }

    #[test]
    fn test_setup_threads_instance() {
        let source = "\
with description('G') as self:
    with before.each:
        self.x = 1
    with it('t'):
        assert self.x == 1
";
        let output = converted(source);
        assert_eq!(
            output,
            "import pytest\nclass TestG:\n    @pytest.fixture(autouse=True)\n    def mamba(self, mamba):\n        mamba = mamba.copy()\n        mamba.x = 1\n        yield mamba\n\n    def test_t(self, mamba):\n        assert mamba.x == 1\n"
        );
    }

    #[test]
    fn test_singleton_context_is_flattened() {
        let source = "\
with description('A'):
  with it('a'):
    pass
  with context('when empty'):
    with it('returns none'):
      pass
";
        insta::assert_snapshot!(converted(source), @r#"
class TestA:
  def test_a(self):
    pass
  def test_when_empty_returns_none(self):
    pass
"#);
    }

    #[test]
    fn test_methods_are_hoisted_and_threaded() {
        let source = "\
with description('Calc') as self:
    def double(self, i):
        return i * self.factor
    with before.each:
        self.factor = 2
    with it('doubles'):
        assert self.double(3) == 6
";
        insta::assert_snapshot!(converted(source), @r#"
import pytest
class TestCalc:
    @pytest.fixture(autouse=True)
    def mamba(self, mamba):
        mamba = mamba.copy()
        def double(mamba, i):
            return i * mamba.factor
        mamba.double = double
        mamba.factor = 2
        yield mamba

    def test_doubles(self, mamba):
        assert mamba.double(mamba, 3) == 6
"#);
    }

    #[test]
    fn test_plain_hooks_become_pass_through_fixtures() {
        let source = "\
with description('Db'):
  with before.all:
    connect()
  with after.all:
    disconnect()
  with it('works'):
    assert True
";
        insta::assert_snapshot!(converted(source), @r#"
import pytest
class TestDb:
  @pytest.fixture(autouse=True, scope="class")
  def mamba_other1(self):
    connect()
    yield
    disconnect()
  def test_works(self):
    assert True
"#);
    }

    #[test]
    fn test_fixture_names_follow_config() {
        let source = "\
with description('G') as self:
  with before.all:
    self.db = 1
  with it('t'):
    assert self.db
";
        let mut config = ConvertConfig::default();
        config.fixtures.group_fixture = "shared".to_string();
        config.fixtures.group_scope = "module".to_string();
        let output = convert(source, &config).unwrap().output;
        assert!(output.contains("@pytest.fixture(autouse=True, scope=\"module\")\n"));
        assert!(output.contains("  def shared(self, shared):\n    shared = shared.copy()\n    shared.db = 1\n"));
        assert!(output.contains("  def test_t(self, mamba):\n    assert mamba.db\n"));
    }

    #[test]
    fn test_counter_restarts_per_conversion() {
        let source = "\
with description('A'):
  with before.each:
    setup()
  with it('a'):
    pass
";
        assert!(converted(source).contains("def mamba_other1(self):"));
        assert!(converted(source).contains("def mamba_other1(self):"));
    }

    #[test]
    fn test_mamba_imports_are_dropped() {
        let output = converted("from mamba import description, it\n\nwith description('A'):\n  with it('b'):\n    pass\n");
        assert!(!output.contains("mamba import"));
        assert!(output.contains("class TestA:\n"));
    }

    #[test]
    fn test_nested_capture_warns() {
        let source = "\
with description('Outer') as self:
  with before.each:
    self.a = 1
  with context('inner') as self:
    with it('x'):
      assert self.a
    with it('y'):
      assert self.a
";
        let conversion = convert(source, &ConvertConfig::default()).unwrap();
        assert_eq!(conversion.warnings.len(), 1);
        assert_eq!(conversion.warnings[0].kind, WarningKind::NestedCapture);
        assert!(conversion.output.contains("      assert mamba.a\n"));
    }

    #[test]
    fn test_nested_capture_assignments_stay_on_self() {
        let source = "\
with description('Outer') as self:
  with before.each:
    self.a = 1
  with context('inner') as self:
    with before.each:
      self.b = 2
    with it('x'):
      assert self.a and self.b
";
        let conversion = convert(source, &ConvertConfig::default()).unwrap();
        assert_eq!(conversion.warnings.len(), 1);
        assert!(conversion.output.contains("      self.b = 2\n"));
        assert!(conversion.output.contains("      assert mamba.a and self.b\n"));
        assert!(!conversion.output.contains("mamba.b"));
    }

    #[test]
    fn test_method_call_from_before_all_warns() {
        let source = "\
with description('G') as self:
  def h(self):
    return 1
  with before.all:
    self.h()
  with it('t'):
    assert self.h() == 1
";
        let conversion = convert(source, &ConvertConfig::default()).unwrap();
        assert_eq!(conversion.warnings.len(), 1);
        assert_eq!(conversion.warnings[0].kind, WarningKind::GroupScopeMethodCall);
        assert_eq!(conversion.warnings[0].span, Span::line(4));
        assert!(conversion.output.contains("    mamba_cls.h(mamba_cls)\n"));
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let error = convert("with description('A'):\n\tpass\n", &ConvertConfig::default()).unwrap_err();
        assert!(matches!(error, ConvertError::Parse(ParseError::TabIndent { line: 2, .. })));
    }

    #[test]
    fn test_duplicate_examples_fail() {
        let source = "\
with description('A'):
  with it('same'):
    pass
  with it('same'):
    pass
";
        let error = convert(source, &ConvertConfig::default()).unwrap_err();
        assert_eq!(
            error,
            ConvertError::Rewrite(RewriteError::DuplicateName {
                name: "test_same".to_string(),
                span: Span::line(4),
            })
        );
        assert_eq!(
            error.to_string(),
            "line 4: ended up with duplicate pytest name, please rename it in the mamba file: test_same"
        );
    }

    #[test]
    fn test_methods_outside_capture_fail() {
        let source = "\
with description('A'):
  def helper(self):
    pass
  with it('b'):
    pass
";
        assert!(matches!(
            convert(source, &ConvertConfig::default()),
            Err(ConvertError::Rewrite(RewriteError::MethodOutsideCapture { .. }))
        ));
    }
}
