//! Extension module descriptor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::toolchain::FlagProfile;
use crate::core::layout::Layout;
use crate::core::manifest::SourceManifest;

/// Source language of a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Language of a source file, judged by its extension.
    ///
    /// Only `.c` is compiled as C; everything else goes to the C++ driver.
    pub fn for_source(path: &Path) -> Language {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") => Language::C,
            _ => Language::Cxx,
        }
    }
}

/// Compiler directives handed to Cython when translating the binding entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CythonDirectives {
    pub binding: bool,
    pub cdivision: bool,
}

impl Default for CythonDirectives {
    fn default() -> Self {
        CythonDirectives {
            binding: true,
            cdivision: true,
        }
    }
}

impl CythonDirectives {
    /// Render as `-X name=value` pairs.
    pub fn to_args(&self) -> Vec<String> {
        let py_bool = |b: bool| if b { "True" } else { "False" };
        vec![
            "-X".to_string(),
            format!("binding={}", py_bool(self.binding)),
            "-X".to_string(),
            format!("cdivision={}", py_bool(self.cdivision)),
        ]
    }
}

/// The compiled extension: an immutable description of what to build.
#[derive(Debug, Clone)]
pub struct Extension {
    /// Dotted module name, e.g. `python_solvespace.slvs`
    pub name: String,
    /// Translation units in manifest order
    pub sources: Vec<PathBuf>,
    /// Link driver language
    pub language: Language,
    /// Include search path
    pub include_dirs: Vec<PathBuf>,
    /// Macros, flags and libraries selected for the toolchain
    pub profile: FlagProfile,
    /// Cython directives for the binding entry
    pub directives: CythonDirectives,
}

impl Extension {
    /// Assemble the descriptor for `package.extension`.
    pub fn new(
        package: &str,
        extension: &str,
        layout: &Layout,
        manifest: &SourceManifest,
        profile: FlagProfile,
    ) -> Self {
        Extension {
            name: format!("{}.{}", package, extension),
            sources: manifest.paths(),
            language: Language::Cxx,
            include_dirs: layout.include_dirs(),
            profile,
            directives: CythonDirectives::default(),
        }
    }

    /// Last component of the dotted name.
    pub fn basename(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Package path of the module, e.g. `python_solvespace/slvs`.
    pub fn module_path(&self) -> PathBuf {
        self.name.split('.').collect()
    }
}
