//! The `conftest.py` that converted modules rely on.

use pytestify_syntax::FormatConfig;

/// Render the support module providing the fixtures named in `config`.
pub fn render(config: &FormatConfig) -> String {
    let example = &config.example_fixture;
    let group = &config.group_fixture;
    format!(
        r#"from __future__ import annotations
from copy import copy

import pytest


class MambaVars:
    def copy(self) -> MambaVars:
        return copy(self)


@pytest.fixture(scope="module")
def {group}():
    return MambaVars()


@pytest.fixture
def {example}({group}):
    return {group}.copy()
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let text = render(&FormatConfig::default());
        assert!(text.contains("def mamba_cls():\n    return MambaVars()\n"));
        assert!(text.contains("def mamba(mamba_cls):\n    return mamba_cls.copy()\n"));
    }

    #[test]
    fn test_configured_names() {
        let config = FormatConfig {
            example_fixture: "inst".to_string(),
            group_fixture: "shared".to_string(),
            ..FormatConfig::default()
        };
        let text = render(&config);
        assert!(text.contains("def shared():"));
        assert!(text.contains("def inst(shared):\n    return shared.copy()\n"));
        assert!(!text.contains("mamba_cls"));
    }
}
