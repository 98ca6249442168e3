//! Python interpreter introspection.
//!
//! The extension is compiled against the headers of a concrete interpreter
//! and must carry that interpreter's extension-module suffix. Both are read
//! by running the interpreter once.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::builder::toolchain::InterpreterVersion;
use crate::util::process::ProcessBuilder;

const QUERY_SCRIPT: &str = "\
import json, sys, sysconfig
print(json.dumps({
    'major': sys.version_info[0],
    'minor': sys.version_info[1],
    'include_dir': sysconfig.get_paths()['include'],
    'ext_suffix': sysconfig.get_config_var('EXT_SUFFIX') or '.so',
    'base_prefix': getattr(sys, 'base_prefix', sys.prefix),
}))
";

#[derive(Debug, Deserialize)]
struct RawQuery {
    major: u32,
    minor: u32,
    include_dir: PathBuf,
    ext_suffix: String,
    base_prefix: PathBuf,
}

/// What the build needs to know about the target interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonConfig {
    /// Interpreter version
    pub version: InterpreterVersion,
    /// Directory holding `Python.h`
    pub include_dir: PathBuf,
    /// Extension module suffix, e.g. `.cpython-38-x86_64-linux-gnu.so`
    pub ext_suffix: String,
    /// Installation prefix (import libraries live in `<prefix>/libs` on Windows)
    pub base_prefix: PathBuf,
}

impl PythonConfig {
    /// Default interpreter name for the host.
    pub fn default_interpreter() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from("python")
        } else {
            PathBuf::from("python3")
        }
    }

    /// Run `python` and read its configuration.
    pub fn query(python: &Path) -> Result<Self> {
        let stdout = ProcessBuilder::new(python)
            .arg("-c")
            .arg(QUERY_SCRIPT)
            .exec_stdout()
            .with_context(|| format!("failed to query interpreter `{}`", python.display()))?;

        let config = PythonConfig::parse(&stdout)?;
        tracing::debug!(
            "python {} (include: {}, suffix: {})",
            config.version,
            config.include_dir.display(),
            config.ext_suffix
        );
        Ok(config)
    }

    /// Parse the JSON printed by the query script.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawQuery = serde_json::from_str(json.trim())
            .context("unexpected output from interpreter query")?;
        Ok(PythonConfig {
            version: InterpreterVersion::new(raw.major, raw.minor),
            include_dir: raw.include_dir,
            ext_suffix: raw.ext_suffix,
            base_prefix: raw.base_prefix,
        })
    }

    /// Import library name for Windows links, e.g. `python38`.
    pub fn import_library(&self) -> String {
        format!("python{}{}", self.version.major, self.version.minor)
    }

    /// Directory holding the Windows import library.
    pub fn import_library_dir(&self) -> PathBuf {
        self.base_prefix.join("libs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let json = r#"{"major": 3, "minor": 6, "include_dir": "C:\\Python36\\Include",
                       "ext_suffix": ".cp36-win_amd64.pyd", "base_prefix": "C:\\Python36"}"#;
        let config = PythonConfig::parse(json).unwrap();

        assert_eq!(config.version, InterpreterVersion::new(3, 6));
        assert_eq!(config.ext_suffix, ".cp36-win_amd64.pyd");
        assert_eq!(config.import_library(), "python36");
        assert_eq!(
            config.import_library_dir(),
            PathBuf::from("C:\\Python36").join("libs")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = PythonConfig::parse("Traceback (most recent call last):").unwrap_err();
        assert!(err.to_string().contains("unexpected output"));
    }
}
