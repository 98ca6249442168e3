//! Fixtures for unit tests.
//!
//! [`SourceTreeFixture`] lays out a project the way it sits in a checkout:
//!
//! ```text
//! <tmp>/
//!   include/  src/  extlib/mimalloc/{include,src}   external sources
//!   python/                                         project root
//!     python_solvespace/__init__.py, slvs.pyx, ...
//! ```
//!
//! The project's external root is `..`, so staging copies from `<tmp>`.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::layout::Layout;
use crate::core::manifest::SourceManifest;
use crate::core::project::Project;
use crate::util::config::{Config, SourcesConfig};

/// Version declared by the fixture package.
pub const FIXTURE_VERSION: &str = "3.0.7";

/// Temporary checkout with external sources and a Python package.
pub struct SourceTreeFixture {
    tmp: TempDir,
}

impl SourceTreeFixture {
    /// Create the full tree: every configured translation unit exists
    /// externally, along with a handful of headers.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let fixture = SourceTreeFixture { tmp };

        fixture.write_external("include/slvs.h", "#pragma once\n");
        fixture.write_external("src/solvespace.h", "#pragma once\n");
        fixture.write_external("src/platform/platform.h", "#pragma once\n");

        let sources = SourcesConfig::default();
        for unit in &sources.native {
            fixture.write_external(&Path::new("src").join(unit), "// native unit\n");
        }

        fixture.write_external("extlib/mimalloc/include/mimalloc.h", "#pragma once\n");
        fixture.write_external("extlib/mimalloc/include/mimalloc/types.h", "#pragma once\n");
        for unit in &sources.allocator {
            fixture.write_external(
                &Path::new("extlib/mimalloc/src").join(unit),
                "/* allocator unit */\n",
            );
        }
        fixture.write_external("extlib/mimalloc/src/prim/osx.c", "/* included by alloc.c */\n");

        fixture.write_project(
            "python_solvespace/__init__.py",
            &format!("__version__ = \"{}\"\n", FIXTURE_VERSION),
        );
        fixture.write_project("python_solvespace/slvs.pyx", "# cython: language_level=3\n");
        fixture.write_project("python_solvespace/slvs.pyi", "def make_quaternion(): ...\n");
        fixture.write_project("python_solvespace/py.typed", "");
        fixture.write_project("README.md", "# Solvespace\n");
        fixture.write_project("requirements.txt", "cython\n");

        fixture
    }

    /// Directory holding the external sources.
    pub fn external_root(&self) -> PathBuf {
        self.tmp.path().to_path_buf()
    }

    pub fn project_root(&self) -> PathBuf {
        self.tmp.path().join("python")
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.project_root(), "python_solvespace", "..", "extlib/mimalloc")
    }

    pub fn manifest(&self) -> SourceManifest {
        SourceManifest::from_config(&self.layout(), &SourcesConfig::default())
    }

    /// Project with the default configuration and no global config merged in.
    pub fn project(&self) -> Project {
        Project::new(self.project_root(), Config::default())
    }

    /// Write a file relative to the external root.
    pub fn write_external(&self, rel: impl AsRef<Path>, contents: &str) {
        write(&self.external_root().join(rel), contents);
    }

    /// Write a file relative to the project root.
    pub fn write_project(&self, rel: impl AsRef<Path>, contents: &str) {
        write(&self.project_root().join(rel), contents);
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    std::fs::write(path, contents).expect("failed to write fixture file");
}
