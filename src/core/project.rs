//! The project being built: its root directory and merged configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::manifest::SourceManifest;
use crate::core::version::read_version;
use crate::util::config::{find_project_root, global_config_path, load_config, Config, PROJECT_CONFIG_NAME};

/// A project rooted at the directory holding `slvs-build.toml`.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Create a project from an explicit root and configuration.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Project {
            root: root.into(),
            config,
        }
    }

    /// Locate the project from `cwd`.
    ///
    /// Walks up to the nearest `slvs-build.toml`; without one, `cwd` itself is
    /// the project root and the defaults apply.
    pub fn discover(cwd: &Path) -> Result<Self> {
        let root = find_project_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
        Project::load(&root)
    }

    /// Load the project rooted at `root`, merging the global config.
    pub fn load(root: &Path) -> Result<Self> {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &root.join(PROJECT_CONFIG_NAME))?;
        tracing::debug!("project root: {}", root.display());
        Ok(Project::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Path of the project config file (which may not exist).
    pub fn config_file(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_NAME)
    }

    pub fn layout(&self) -> Layout {
        Layout::from_config(&self.root, &self.config)
    }

    pub fn manifest(&self) -> SourceManifest {
        SourceManifest::from_config(&self.layout(), &self.config.sources)
    }

    /// Dotted Python package name of the module root.
    pub fn package_name(&self) -> String {
        self.config
            .package
            .module
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Directory for intermediate and final build outputs.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Version declared in the package's `__init__.py`.
    pub fn version(&self) -> Result<String> {
        read_version(&self.layout().module_root().join("__init__.py"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_without_config_uses_cwd() {
        let tmp = TempDir::new().unwrap();
        let project = Project::discover(tmp.path()).unwrap();

        assert_eq!(project.root(), tmp.path());
        assert_eq!(project.package_name(), "python_solvespace");
        assert_eq!(
            project.layout().module_root(),
            tmp.path().join("python_solvespace")
        );
    }

    #[test]
    fn test_version_from_init() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("python_solvespace");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("__init__.py"), "__version__ = \"3.0.1\"\n").unwrap();

        let project = Project::discover(tmp.path()).unwrap();
        assert_eq!(project.version().unwrap(), "3.0.1");
    }

    #[test]
    fn test_nested_module_package_name() {
        let mut config = Config::default();
        config.package.module = PathBuf::from("pkg").join("solver");
        let project = Project::new("/p", config);
        assert_eq!(project.package_name(), "pkg.solver");
    }
}
