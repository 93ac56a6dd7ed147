//! Conversion settings.
//!
//! Usually loaded from a `pytestify.toml`:
//!
//! ```toml
//! indent_step = 4
//!
//! [fixtures]
//! example_fixture = "mamba"
//! group_fixture = "mamba_cls"
//! other_fixture_prefix = "mamba_other"
//! group_scope = "class"
//! ```

use pytestify_syntax::FormatConfig;
use serde::Deserialize;

/// Settings for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Indentation added for the body of a hoisted method (default: 4).
    pub indent_step: usize,
    /// Fixture naming and scoping.
    pub fixtures: FormatConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            indent_step: 4,
            fixtures: FormatConfig::default(),
        }
    }
}
