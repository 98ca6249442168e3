//! Build plan for the extension module.
//!
//! A plan is one compile step per translation unit followed by a single link
//! step producing the loadable module.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::cython::CythonTranslator;
use crate::builder::python::PythonConfig;
use crate::builder::toolchain::{CompileInput, LinkInput, Toolchain, ToolchainFamily};
use crate::core::extension::{Extension, Language};
use crate::util::fs::write_string;

/// Compile one translation unit into an object file.
#[derive(Debug, Clone)]
pub struct CompileStep {
    pub lang: Language,
    pub input: CompileInput,
}

/// Link all objects into the extension module.
#[derive(Debug, Clone)]
pub struct LinkStep {
    pub driver: Language,
    pub input: LinkInput,
}

/// A complete build plan.
#[derive(Debug, Clone)]
pub struct ExtensionPlan {
    pub compile_steps: Vec<CompileStep>,
    pub link: LinkStep,
    /// Directory holding object files
    pub temp_dir: PathBuf,
}

/// Entry in a `compile_commands.json` database.
#[derive(Debug, Serialize)]
struct CompileCommand {
    directory: String,
    file: String,
    arguments: Vec<String>,
    output: String,
}

/// Compile flags for one language. A C++ language standard is rejected by
/// some C drivers, so it is dropped for C units.
fn flags_for(lang: Language, flags: &[String]) -> Vec<String> {
    match lang {
        Language::Cxx => flags.to_vec(),
        Language::C => flags
            .iter()
            .filter(|f| !f.starts_with("-std=c++") && !f.starts_with("/std:c++"))
            .cloned()
            .collect(),
    }
}

impl ExtensionPlan {
    /// Plan the build of `ext`.
    ///
    /// Cython sources are replaced by their generated C++ file. Object files
    /// mirror the source layout under `build_dir/temp`, and the module lands
    /// under `build_dir/lib`.
    pub fn new(
        ext: &Extension,
        module_root: &Path,
        python: &PythonConfig,
        family: ToolchainFamily,
        object_extension: &str,
        build_dir: &Path,
    ) -> Self {
        let temp_dir = build_dir.join("temp");

        let mut include_dirs = ext.include_dirs.clone();
        include_dirs.push(python.include_dir.clone());

        let compile_steps: Vec<CompileStep> = ext
            .sources
            .iter()
            .map(|source| {
                let source = if CythonTranslator::is_cython_source(source) {
                    CythonTranslator::output_for(source)
                } else {
                    source.clone()
                };
                let rel = source
                    .strip_prefix(module_root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
                let object = temp_dir.join(rel).with_extension(object_extension);
                let lang = Language::for_source(&source);

                CompileStep {
                    lang,
                    input: CompileInput {
                        source,
                        output: object,
                        include_dirs: include_dirs.clone(),
                        defines: ext.profile.defines.clone(),
                        cflags: flags_for(lang, &ext.profile.compile_args),
                    },
                }
            })
            .collect();

        let module_path = ext.module_path();
        let module_dir = module_path.parent().unwrap_or_else(|| Path::new(""));
        let output = build_dir
            .join("lib")
            .join(module_dir)
            .join(format!("{}{}", ext.basename(), python.ext_suffix));

        let mut lib_dirs = Vec::new();
        let mut libs = ext.profile.libraries.clone();
        if matches!(family, ToolchainFamily::Msvc | ToolchainFamily::Mingw32) {
            lib_dirs.push(python.import_library_dir());
            libs.push(python.import_library());
        }

        let link = LinkStep {
            driver: ext.language,
            input: LinkInput {
                objects: compile_steps.iter().map(|s| s.input.output.clone()).collect(),
                output,
                lib_dirs,
                libs,
                ldflags: ext.profile.link_args.clone(),
                exports: vec![format!("PyInit_{}", ext.basename())],
            },
        };

        ExtensionPlan {
            compile_steps,
            link,
            temp_dir,
        }
    }

    /// Path of the linked module.
    pub fn output(&self) -> &Path {
        &self.link.input.output
    }

    /// Number of compile steps.
    pub fn compile_count(&self) -> usize {
        self.compile_steps.len()
    }

    /// Write a `compile_commands.json` database for the compile steps.
    pub fn emit_compile_commands(&self, toolchain: &dyn Toolchain, path: &Path) -> Result<()> {
        let commands: Vec<CompileCommand> = self
            .compile_steps
            .iter()
            .map(|step| {
                let spec = toolchain.compile_command(&step.input, step.lang);
                CompileCommand {
                    directory: step
                        .input
                        .source
                        .parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| ".".to_string()),
                    file: step.input.source.display().to_string(),
                    arguments: spec.to_argv(),
                    output: step.input.output.display().to_string(),
                }
            })
            .collect();

        let json = serde_json::to_string_pretty(&commands)
            .context("failed to serialize compile commands")?;
        write_string(path, &json)?;
        tracing::info!("Wrote {}", path.display());

        Ok(())
    }
}
