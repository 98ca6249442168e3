//! SHA-256 helpers for compile fingerprints.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hash over a sequence of strings. Each component is NUL-terminated so
/// `["-O3", "-g"]` and `["-O3-g"]` hash differently.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint::default()
    }

    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update([0u8]);
        self
    }

    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        items.into_iter().for_each(|s| {
            self.update_str(s);
        });
        self
    }

    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// First 16 hex digits of [`finish`](Self::finish).
    pub fn finish_short(self) -> String {
        let mut full = self.finish();
        full.truncate(16);
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("util.cpp");
        std::fs::write(&path, "hello").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = sha256_file(&tmp.path().join("gone.cpp")).unwrap_err();
        assert!(err.to_string().contains("gone.cpp"));
    }

    #[test]
    fn test_fingerprint_separates_components() {
        let joined = {
            let mut fp = Fingerprint::new();
            fp.update_strs(["-O3", "-g"]);
            fp.finish()
        };
        let merged = {
            let mut fp = Fingerprint::new();
            fp.update_str("-O3-g");
            fp.finish()
        };

        assert_ne!(joined, merged);
        assert_eq!(Fingerprint::new().finish_short().len(), 16);
    }
}
