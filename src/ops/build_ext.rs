//! Implementation of `slvs-build build-ext`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::cython::CythonTranslator;
use crate::builder::executor::BuildExecutor;
use crate::builder::plan::ExtensionPlan;
use crate::builder::python::PythonConfig;
use crate::builder::toolchain::{
    detect_toolchain, select_toolchain_flags, TargetOs, Toolchain, ToolchainFamily,
};
use crate::core::extension::Extension;
use crate::core::project::Project;
use crate::ops::lifecycle::{run_build_hook, ExtensionBackend, StagingState};
use crate::util::fs::copy_file;

/// Options for the build-ext command.
#[derive(Debug, Clone, Default)]
pub struct BuildExtOptions {
    /// Toolchain family (overrides `[build] compiler`)
    pub compiler: Option<ToolchainFamily>,

    /// Python interpreter to build against
    pub python: Option<PathBuf>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Print what would happen without touching the disk
    pub dry_run: bool,

    /// Also copy the module next to the package sources
    pub inplace: bool,

    /// Emit compile_commands.json
    pub emit_compile_commands: bool,

    /// Verbose output
    pub verbose: bool,
}

/// What a build-ext run produced.
#[derive(Debug, Clone)]
pub struct BuildExtResult {
    /// Toolchain family used
    pub family: ToolchainFamily,
    /// Linked module under `build/lib`
    pub output: PathBuf,
    /// Every file written (module, in-place copy, compile database)
    pub artifacts: Vec<PathBuf>,
    /// Whether the staging tree was created for this run
    pub staging: StagingState,
}

/// Compiles the planned extension once the sources are staged.
struct NativeBackend<'a> {
    toolchain: &'a dyn Toolchain,
    plan: &'a ExtensionPlan,
    cython: CythonTranslator,
    binding: PathBuf,
    module_root: PathBuf,
    compile_commands: Option<PathBuf>,
    jobs: Option<usize>,
    verbose: bool,
    inplace: bool,
}

impl ExtensionBackend for NativeBackend<'_> {
    fn build(&mut self, dry_run: bool) -> Result<Vec<PathBuf>> {
        if CythonTranslator::is_cython_source(&self.binding) {
            self.cython.translate(&self.binding, dry_run)?;
        }

        let mut artifacts = Vec::new();

        if let Some(ref path) = self.compile_commands {
            if !dry_run {
                self.plan.emit_compile_commands(self.toolchain, path)?;
                artifacts.push(path.clone());
            }
        }

        BuildExecutor::new(self.toolchain)
            .verbose(self.verbose)
            .dry_run(dry_run)
            .execute(self.plan, self.jobs)?;
        artifacts.push(self.plan.output().to_path_buf());

        if self.inplace {
            let dest = inplace_destination(&self.module_root, self.plan.output())
                .context("extension output has no file name")?;
            // Nothing was linked in a dry run, so there is nothing to copy yet
            if !dry_run {
                copy_file(self.plan.output(), &dest, false)?;
            }
            tracing::info!("Copying {} to {}", self.plan.output().display(), dest.display());
            artifacts.push(dest);
        }

        Ok(artifacts)
    }
}

/// Resolve the toolchain family from the CLI and then the config.
fn requested_family(project: &Project, opts: &BuildExtOptions) -> Result<Option<ToolchainFamily>> {
    if let Some(family) = opts.compiler {
        return Ok(Some(family));
    }
    match project.config().build.compiler {
        Some(ref name) => Ok(Some(name.parse::<ToolchainFamily>()?)),
        None => Ok(None),
    }
}

/// Parallel jobs: the CLI value, then `[build] jobs`.
fn requested_jobs(project: &Project, opts: &BuildExtOptions) -> Option<usize> {
    opts.jobs.or(project.config().build.jobs)
}

/// Build the extension module.
///
/// Stages sources if the tree is absent, translates the Cython binding,
/// compiles every unit with the selected flag profile and links the module
/// under `build/lib`. The staging tree is removed afterwards only if this run
/// created it.
pub fn build_ext(project: &Project, opts: &BuildExtOptions) -> Result<BuildExtResult> {
    let config = project.config();
    let os = TargetOs::host();

    let python_exe = opts
        .python
        .clone()
        .or_else(|| config.build.python.clone())
        .unwrap_or_else(PythonConfig::default_interpreter);
    let python = PythonConfig::query(&python_exe)?;
    tracing::info!(
        "Building against Python {} ({})",
        python.version,
        python_exe.display()
    );

    let requested = requested_family(project, opts)?;
    let detected = detect_toolchain(&config.toolchain, requested, os)?;
    let profile = select_toolchain_flags(detected.family, os, python.version)?;

    let layout = project.layout();
    let manifest = project.manifest();
    let ext = Extension::new(
        &project.package_name(),
        &config.package.extension,
        &layout,
        &manifest,
        profile,
    );
    tracing::debug!("extension {} with {} sources", ext.name, ext.sources.len());

    let build_dir = project.build_dir();
    let plan = ExtensionPlan::new(
        &ext,
        layout.module_root(),
        &python,
        detected.family,
        detected.toolchain.object_extension(),
        &build_dir,
    );

    let cython_exe = config
        .build
        .cython
        .clone()
        .unwrap_or_else(|| PathBuf::from("cython"));
    let emit = opts.emit_compile_commands || config.build.emit_compile_commands.unwrap_or(false);

    let mut backend = NativeBackend {
        toolchain: detected.toolchain.as_ref(),
        plan: &plan,
        cython: CythonTranslator::new(cython_exe, ext.directives),
        binding: manifest.binding().to_path_buf(),
        module_root: layout.module_root().to_path_buf(),
        compile_commands: emit.then(|| build_dir.join("compile_commands.json")),
        jobs: requested_jobs(project, opts),
        verbose: opts.verbose,
        inplace: opts.inplace,
    };

    let report = run_build_hook(&layout, &manifest, &mut backend, opts.dry_run)?;

    Ok(BuildExtResult {
        family: detected.family,
        output: plan.output().to_path_buf(),
        artifacts: report.output,
        staging: report.staging,
    })
}

/// Copy destination of the module for an in-place build.
fn inplace_destination(module_root: &Path, output: &Path) -> Option<PathBuf> {
    output.file_name().map(|name| module_root.join(name))
}
