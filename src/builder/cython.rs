//! Cython translation of the binding entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::extension::CythonDirectives;
use crate::util::process::ProcessBuilder;

/// Translates `.pyx` sources into C++.
#[derive(Debug, Clone)]
pub struct CythonTranslator {
    cython: PathBuf,
    directives: CythonDirectives,
}

impl CythonTranslator {
    pub fn new(cython: impl Into<PathBuf>, directives: CythonDirectives) -> Self {
        CythonTranslator {
            cython: cython.into(),
            directives,
        }
    }

    /// Whether a source needs translating before compilation.
    pub fn is_cython_source(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("pyx")
    }

    /// Where the generated C++ for `pyx` is written: next to it, as `.cpp`.
    pub fn output_for(pyx: &Path) -> PathBuf {
        pyx.with_extension("cpp")
    }

    /// The cython command line for one source.
    pub fn command(&self, pyx: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.cython)
            .arg("--cplus")
            .args(self.directives.to_args())
            .arg("-o")
            .arg(Self::output_for(pyx))
            .arg(pyx)
    }

    /// Translate `pyx` and return the path of the generated C++ file.
    ///
    /// Translation is skipped when the output is newer than the input.
    pub fn translate(&self, pyx: &Path, dry_run: bool) -> Result<PathBuf> {
        let output = Self::output_for(pyx);

        if is_up_to_date(pyx, &output) {
            tracing::debug!("{} is up to date", output.display());
            return Ok(output);
        }

        let cmd = self.command(pyx);
        tracing::debug!("{}", cmd.display_command());

        if !dry_run {
            cmd.exec_and_check()
                .with_context(|| format!("failed to cythonize {}", pyx.display()))?;
        }

        Ok(output)
    }
}

fn is_up_to_date(input: &Path, output: &Path) -> bool {
    let modified = |p: &Path| p.metadata().and_then(|m| m.modified()).ok();
    match (modified(input), modified(output)) {
        (Some(input), Some(output)) => output >= input,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let translator = CythonTranslator::new("cython", CythonDirectives::default());
        let cmd = translator.command(Path::new("pkg/slvs.pyx"));

        assert_eq!(
            cmd.display_command(),
            "cython --cplus -X binding=True -X cdivision=True -o pkg/slvs.cpp pkg/slvs.pyx"
        );
    }

    #[test]
    fn test_is_cython_source() {
        assert!(CythonTranslator::is_cython_source(Path::new("slvs.pyx")));
        assert!(!CythonTranslator::is_cython_source(Path::new("slvs.cpp")));
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let tmp = tempfile::TempDir::new().unwrap();
        let pyx = tmp.path().join("slvs.pyx");
        std::fs::write(&pyx, "").unwrap();

        let translator =
            CythonTranslator::new("definitely-not-cython", CythonDirectives::default());
        let out = translator.translate(&pyx, true).unwrap();

        assert_eq!(out, tmp.path().join("slvs.cpp"));
        assert!(!out.exists());
    }
}
