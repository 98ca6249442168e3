//! Package version lookup.
//!
//! The version lives in the Python package's `__init__.py` as a single
//! assignment line, `__version__ = "X.Y.Z"`.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::util::fs::read_to_string;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^__version__ = ['"]([^'"]*)['"]"#).expect("version pattern is valid")
});

/// Error when the version string is missing.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Unable to find version string.")]
    NotFound,
}

/// Extract the version from the contents of a metadata file.
pub fn find_version(contents: &str) -> Result<String, VersionError> {
    VERSION_LINE
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(VersionError::NotFound)
}

/// Read a metadata file and extract its version.
pub fn read_version(path: &Path) -> Result<String> {
    let contents = read_to_string(path)?;
    let version =
        find_version(&contents).with_context(|| format!("in {}", path.display()))?;
    Ok(version)
}
