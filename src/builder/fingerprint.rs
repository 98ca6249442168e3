//! Build fingerprinting for incremental builds.
//!
//! Each object file gets a sidecar `<object>.fp` recording the hash of the
//! source it came from and of the exact command line. When both still match,
//! the compile step is skipped.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::CommandSpec;
use crate::util::hash::{sha256_file, Fingerprint as HashFingerprint};

/// Fingerprint for a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFingerprint {
    /// Source file hash
    pub source_hash: String,

    /// Command line hash
    pub command_hash: String,
}

impl CompileFingerprint {
    /// Create a fingerprint for a source file and the command compiling it.
    pub fn for_source(source: &Path, command: &CommandSpec) -> Result<Self> {
        let source_hash = sha256_file(source)?;

        let mut fp = HashFingerprint::new();
        let argv = command.to_argv();
        fp.update_strs(argv.iter().map(String::as_str));

        Ok(CompileFingerprint {
            source_hash,
            command_hash: fp.finish_short(),
        })
    }

    /// Sidecar path for an object file.
    pub fn path_for(object: &Path) -> PathBuf {
        let mut name = object.as_os_str().to_owned();
        name.push(".fp");
        PathBuf::from(name)
    }

    /// Load the stored fingerprint of an object, if any.
    pub fn load(object: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(Self::path_for(object)).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Store this fingerprint next to the object.
    pub fn save(&self, object: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        crate::util::fs::write_string(&Self::path_for(object), &json)
    }

    /// Whether `object` exists and was built from exactly these inputs.
    pub fn is_fresh(&self, object: &Path) -> bool {
        object.exists() && Self::load(object).as_ref() == Some(self)
    }
}
