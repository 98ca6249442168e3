//! Configuration file support for slvs-build.
//!
//! Two configuration file locations are read:
//! - Global: `~/.slvs-build/config.toml` - user-wide `[build]` and `[toolchain]` defaults
//! - Project: `slvs-build.toml` at the project root - everything else
//!
//! Project config takes precedence over global config. Every key is optional;
//! the defaults describe the python_solvespace package layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the project configuration.
pub const PROJECT_CONFIG_NAME: &str = "slvs-build.toml";

/// Error while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// slvs-build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package metadata and naming
    pub package: PackageConfig,

    /// Where the external sources live
    pub layout: LayoutConfig,

    /// Translation units of the extension
    pub sources: SourcesConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Compiler driver overrides
    pub toolchain: ToolchainSettings,
}

/// Package metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageConfig {
    /// Distribution name
    pub name: String,

    /// Python package directory, relative to the project root
    pub module: PathBuf,

    /// Extension module name inside the package
    pub extension: String,

    /// One-line summary written to PKG-INFO
    pub summary: String,

    /// Project homepage
    pub url: Option<String>,

    /// README file, relative to the project root
    pub readme: PathBuf,

    /// Requirements file, relative to the project root
    pub requirements: PathBuf,

    /// Glob patterns of data files shipped with the package
    pub package_data: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            name: "python_solvespace".to_string(),
            module: PathBuf::from("python_solvespace"),
            extension: "slvs".to_string(),
            summary: "Python library of Solvespace.".to_string(),
            url: Some("https://github.com/KmolYuan/solvespace".to_string()),
            readme: PathBuf::from("README.md"),
            requirements: PathBuf::from("requirements.txt"),
            package_data: vec![
                "*.pyi".to_string(),
                "*.pxd".to_string(),
                "py.typed".to_string(),
            ],
        }
    }
}

/// Location of the external source roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Root holding `include/`, `src/` and the allocator, relative to the project root
    pub external_root: PathBuf,

    /// Allocator directory, relative to both the external root and the module root
    pub allocator: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            external_root: PathBuf::from(".."),
            allocator: PathBuf::from("extlib").join("mimalloc"),
        }
    }
}

/// Translation units, listed relative to their source directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourcesConfig {
    /// Binding entry point, relative to the module root
    pub binding: PathBuf,

    /// Native library units, relative to `src/`
    pub native: Vec<PathBuf>,

    /// Allocator units, relative to the allocator's `src/`
    pub allocator: Vec<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let native = [
            "util.cpp",
            "entity.cpp",
            "expr.cpp",
            "constraint.cpp",
            "constrainteq.cpp",
            "system.cpp",
            "lib.cpp",
            "platform/platform.cpp",
        ];
        let allocator = [
            "stats.c",
            "random.c",
            "os.c",
            "arena.c",
            "region.c",
            "segment.c",
            "page.c",
            "alloc.c",
            "alloc-aligned.c",
            "alloc-posix.c",
            "heap.c",
            "options.c",
            "init.c",
        ];

        SourcesConfig {
            binding: PathBuf::from("slvs.pyx"),
            native: native.iter().map(PathBuf::from).collect(),
            allocator: allocator.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Compiler family override (unix, mingw32, msvc)
    pub compiler: Option<String>,

    /// Python interpreter used for introspection
    pub python: Option<PathBuf>,

    /// Cython executable
    pub cython: Option<PathBuf>,

    /// Default number of parallel jobs (None = auto-detect)
    pub jobs: Option<usize>,

    /// Keep the staged tree after `sdist`
    pub keep_temp: Option<bool>,

    /// Always emit compile_commands.json
    pub emit_compile_commands: Option<bool>,
}

impl BuildConfig {
    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: BuildConfig) {
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.python.is_some() {
            self.python = other.python;
        }
        if other.cython.is_some() {
            self.cython = other.cython;
        }
        if other.jobs.is_some() {
            self.jobs = other.jobs;
        }
        if other.keep_temp.is_some() {
            self.keep_temp = other.keep_temp;
        }
        if other.emit_compile_commands.is_some() {
            self.emit_compile_commands = other.emit_compile_commands;
        }
    }
}

/// Compiler driver overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to the C++ compiler (e.g., /usr/bin/clang++)
    pub cxx: Option<PathBuf>,
}

impl ToolchainSettings {
    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainSettings) {
        if other.cc.is_some() {
            self.cc = other.cc;
        }
        if other.cxx.is_some() {
            self.cxx = other.cxx;
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// The global file only contributes `[build]` and `[toolchain]`. A project
/// file that exists but cannot be parsed is an error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config, ConfigError> {
    let mut config = if project_path.exists() {
        Config::load(project_path)?
    } else {
        Config::default()
    };

    if let Some(global_path) = global_path {
        let global = Config::load_or_default(global_path);
        let mut build = global.build;
        build.merge(config.build);
        config.build = build;

        let mut toolchain = global.toolchain;
        toolchain.merge(config.toolchain);
        config.toolchain = toolchain;
    }

    Ok(config)
}

/// Get the global config directory (~/.slvs-build).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slvs-build"))
}

/// Get the global config path (~/.slvs-build/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Find the project root by walking up from `start` to the first directory
/// holding a `slvs-build.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_NAME).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_describe_solvespace() {
        let config = Config::default();
        assert_eq!(config.package.module, PathBuf::from("python_solvespace"));
        assert_eq!(config.package.extension, "slvs");
        assert_eq!(config.layout.external_root, PathBuf::from(".."));
        assert_eq!(config.sources.native.len(), 8);
        assert_eq!(config.sources.allocator.len(), 13);
        assert_eq!(config.build.keep_temp, None);
    }

    #[test]
    fn test_partial_project_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_CONFIG_NAME);
        std::fs::write(
            &path,
            "[build]\njobs = 4\nkeep-temp = true\n\n[layout]\nexternal-root = \"vendor\"\n",
        )
        .unwrap();

        let config = load_config(None, &path).unwrap();
        assert_eq!(config.build.jobs, Some(4));
        assert_eq!(config.build.keep_temp, Some(true));
        assert_eq!(config.layout.external_root, PathBuf::from("vendor"));
        // Untouched sections keep their defaults
        assert_eq!(config.package.extension, "slvs");
        assert_eq!(config.sources.binding, PathBuf::from("slvs.pyx"));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join(PROJECT_CONFIG_NAME);
        std::fs::write(
            &global,
            "[build]\ncompiler = \"msvc\"\njobs = 2\n\n[toolchain]\ncc = \"/opt/cc\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[build]\njobs = 8\n").unwrap();

        let config = load_config(Some(&global), &project).unwrap();
        assert_eq!(config.build.compiler.as_deref(), Some("msvc"));
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/opt/cc")));
    }

    #[test]
    fn test_project_can_switch_off_global_flags() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join(PROJECT_CONFIG_NAME);
        std::fs::write(
            &global,
            "[build]\nkeep-temp = true\nemit-compile-commands = true\n",
        )
        .unwrap();
        std::fs::write(&project, "[build]\nkeep-temp = false\n").unwrap();

        let config = load_config(Some(&global), &project).unwrap();
        assert_eq!(config.build.keep_temp, Some(false));
        assert_eq!(config.build.emit_compile_commands, Some(true));
    }

    #[test]
    fn test_broken_project_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_CONFIG_NAME);
        std::fs::write(&path, "[build\n").unwrap();

        let err = load_config(None, &path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_find_project_root() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(PROJECT_CONFIG_NAME), "").unwrap();

        let root = find_project_root(&nested).unwrap();
        assert_eq!(root, tmp.path());
    }
}
