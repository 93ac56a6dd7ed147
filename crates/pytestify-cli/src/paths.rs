//! Input discovery and output naming for `pytestify convert`.
//!
//! A live mamba spec `test_<base>_spec.py` converts to `test_<base>.py` and is
//! then renamed to `disabled_<base>_disabled.py`, so pytest no longer collects
//! it but it can be converted again later.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

/// Base name used for a bare `test_spec.py`.
const BARE_SPEC_BASE: &str = "it";

/// What `convert` does with one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// The pytest file to write.
    pub output: PathBuf,
    /// Where the input goes afterwards; `None` for already disabled inputs.
    pub disabled: Option<PathBuf>,
}

/// Split a mamba spec file name into its kind and base name.
fn classify_name(name: &str) -> Option<(bool, &str)> {
    if let Some(base) = name
        .strip_prefix("disabled_")
        .and_then(|rest| rest.strip_suffix("_disabled.py"))
    {
        return Some((false, base));
    }
    if name == "test_spec.py" {
        return Some((true, BARE_SPEC_BASE));
    }
    name.strip_prefix("test_")
        .and_then(|rest| rest.strip_suffix("_spec.py"))
        .map(|base| (true, base))
}

/// Whether `path` is named like a mamba spec, live or disabled.
pub fn is_spec_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(classify_name)
        .is_some()
}

/// Output and rename targets for `input`.
pub fn plan(input: &Path) -> Result<Plan> {
    let name = input.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    let Some((enabled, base)) = classify_name(name) else {
        anyhow::bail!("does not look like a mamba test file: {}", input.display());
    };

    let output = input.with_file_name(format!("test_{base}.py"));
    let disabled = enabled.then(|| input.with_file_name(format!("disabled_{base}_disabled.py")));
    Ok(Plan { output, disabled })
}

/// Expand command line arguments into input files.
///
/// Files are taken as given. Directories are walked for spec files. Anything
/// else is treated as a glob pattern, which must match at least one file.
pub fn expand(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for arg in args {
        if arg.is_file() {
            files.push(arg.clone());
        } else if arg.is_dir() {
            files.extend(walk(arg));
        } else {
            files.extend(glob_files(arg)?);
        }
    }
    Ok(files)
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_spec_file(path))
        .collect();
    found.sort();
    found
}

fn glob_files(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern)
        .map_err(|e| anyhow::anyhow!("Invalid pattern {}: {}", pattern, e))?;
    let files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    if files.is_empty() {
        anyhow::bail!("No files match {}", pattern);
    }
    Ok(files)
}
