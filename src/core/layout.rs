//! Staging tree layout.
//!
//! The extension is built from a self-contained tree under the module root:
//!
//! ```text
//! python_solvespace/
//!   include/                  merged native + allocator headers
//!   src/                      native library sources
//!     platform/config.h       empty placeholder
//!   extlib/mimalloc/
//!     include/
//!     src/
//! ```
//!
//! The same relative shape exists under the external root (by default the
//! parent of the project root), which is where the sources are copied from.

use std::path::{Component, Path, PathBuf};

use crate::util::config::Config;

/// Paths of the staging tree and of the external roots it mirrors.
#[derive(Debug, Clone)]
pub struct Layout {
    project_root: PathBuf,
    module_root: PathBuf,
    external_root: PathBuf,
    allocator: PathBuf,
}

impl Layout {
    /// Create a layout.
    ///
    /// `module` and `external_root` are relative to `project_root`, `allocator`
    /// is relative to both the module root and the external root.
    pub fn new(
        project_root: impl Into<PathBuf>,
        module: impl AsRef<Path>,
        external_root: impl AsRef<Path>,
        allocator: impl Into<PathBuf>,
    ) -> Self {
        let project_root = project_root.into();
        Layout {
            module_root: project_root.join(module),
            external_root: project_root.join(external_root),
            allocator: allocator.into(),
            project_root,
        }
    }

    /// Build the layout described by a configuration.
    pub fn from_config(project_root: &Path, config: &Config) -> Self {
        Layout::new(
            project_root,
            &config.package.module,
            &config.layout.external_root,
            config.layout.allocator.clone(),
        )
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn module_root(&self) -> &Path {
        &self.module_root
    }

    pub fn external_root(&self) -> &Path {
        &self.external_root
    }

    /// Local merged header directory.
    pub fn include_dir(&self) -> PathBuf {
        self.module_root.join("include")
    }

    /// Local native source directory.
    pub fn src_dir(&self) -> PathBuf {
        self.module_root.join("src")
    }

    /// Local platform source directory.
    pub fn platform_dir(&self) -> PathBuf {
        self.src_dir().join("platform")
    }

    /// Empty configuration header created at stage time.
    pub fn config_header(&self) -> PathBuf {
        self.platform_dir().join("config.h")
    }

    /// Local allocator directory.
    pub fn allocator_dir(&self) -> PathBuf {
        self.module_root.join(&self.allocator)
    }

    pub fn allocator_include_dir(&self) -> PathBuf {
        self.allocator_dir().join("include")
    }

    pub fn allocator_src_dir(&self) -> PathBuf {
        self.allocator_dir().join("src")
    }

    pub fn external_include_dir(&self) -> PathBuf {
        self.external_root.join("include")
    }

    pub fn external_src_dir(&self) -> PathBuf {
        self.external_root.join("src")
    }

    pub fn external_allocator_include_dir(&self) -> PathBuf {
        self.external_root.join(&self.allocator).join("include")
    }

    pub fn external_allocator_src_dir(&self) -> PathBuf {
        self.external_root.join(&self.allocator).join("src")
    }

    /// The three subtrees that make up a staged tree, in teardown order.
    pub fn staged_subtrees(&self) -> [PathBuf; 3] {
        [self.include_dir(), self.src_dir(), self.allocator_dir()]
    }

    /// Whether a staged tree is already present.
    pub fn is_staged(&self) -> bool {
        self.staged_subtrees().iter().all(|dir| dir.is_dir())
    }

    /// Include search path of the extension.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.include_dir(),
            self.src_dir(),
            self.allocator_include_dir(),
            self.allocator_src_dir(),
        ]
    }

    /// Map a path under the module root to the same path under the external root.
    pub fn to_external(&self, local: &Path) -> Option<PathBuf> {
        let rel = local.strip_prefix(&self.module_root).ok()?;
        Some(self.external_root.join(rel))
    }

    /// Map a path under the external root to the same path under the module root.
    pub fn to_local(&self, external: &Path) -> Option<PathBuf> {
        let rel = external.strip_prefix(&self.external_root).ok()?;
        if rel.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }
        Some(self.module_root.join(rel))
    }
}
