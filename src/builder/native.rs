//! Native C/C++ compiler driver.
//!
//! Compiles every translation unit of a plan in parallel, then links the
//! extension module.

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::builder::fingerprint::CompileFingerprint;
use crate::builder::plan::{CompileStep, ExtensionPlan};
use crate::builder::toolchain::{CommandSpec, Toolchain};
use crate::util::fs::mkpath;
use crate::util::process::ProcessBuilder;

/// Outcome of a single compile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled,
    Fresh,
    Skipped,
}

/// Native C/C++ builder.
pub struct NativeBuilder<'a> {
    toolchain: &'a dyn Toolchain,
    dry_run: bool,
    progress: Option<ProgressBar>,
}

impl<'a> NativeBuilder<'a> {
    /// Create a new native builder.
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        NativeBuilder {
            toolchain,
            dry_run: false,
            progress: None,
        }
    }

    /// Print commands instead of running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Advance `progress` once per finished step.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execute the plan and return the number of translation units that were
    /// actually recompiled.
    ///
    /// Compile steps run in parallel on a pool of `jobs` threads (all cores
    /// when `None`); the link step runs afterwards.
    pub fn execute(&self, plan: &ExtensionPlan, jobs: Option<usize>) -> Result<usize> {
        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(j) = jobs {
            pool = pool.num_threads(j);
        }
        let pool = pool.build().context("failed to start compile thread pool")?;

        tracing::info!("Compiling {} files", plan.compile_count());

        let outcomes: Vec<Result<CompileOutcome>> = pool.install(|| {
            plan.compile_steps
                .par_iter()
                .map(|step| {
                    let outcome = self.compile(step);
                    if let Some(ref pb) = self.progress {
                        pb.inc(1);
                    }
                    outcome
                })
                .collect()
        });

        let mut compiled = 0;
        for outcome in outcomes {
            if outcome? == CompileOutcome::Compiled {
                compiled += 1;
            }
        }

        self.link(plan)?;
        if let Some(ref pb) = self.progress {
            pb.inc(1);
        }

        Ok(compiled)
    }

    fn compile(&self, step: &CompileStep) -> Result<CompileOutcome> {
        let spec = self.toolchain.compile_command(&step.input, step.lang);

        if self.dry_run {
            tracing::info!("{}", spec.to_argv().join(" "));
            return Ok(CompileOutcome::Skipped);
        }

        let object = &step.input.output;
        let fingerprint = CompileFingerprint::for_source(&step.input.source, &spec)?;
        if fingerprint.is_fresh(object) {
            tracing::debug!("{} is fresh", object.display());
            return Ok(CompileOutcome::Fresh);
        }

        if let Some(parent) = object.parent() {
            mkpath(parent, false)?;
        }

        tracing::debug!("{}", spec.to_argv().join(" "));
        let output = process_builder_from_spec(&spec).exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "compilation failed for {}\n{}",
                step.input.source.display(),
                stderr
            );
        }

        fingerprint.save(object)?;
        Ok(CompileOutcome::Compiled)
    }

    fn link(&self, plan: &ExtensionPlan) -> Result<()> {
        let spec = self
            .toolchain
            .link_extension_command(&plan.link.input, plan.link.driver);

        if self.dry_run {
            tracing::info!("{}", spec.to_argv().join(" "));
            return Ok(());
        }

        if let Some(parent) = plan.output().parent() {
            mkpath(parent, false)?;
        }

        tracing::debug!("{}", spec.to_argv().join(" "));
        let output = process_builder_from_spec(&spec).exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("linking failed for {}\n{}", plan.output().display(), stderr);
        }

        Ok(())
    }
}

fn process_builder_from_spec(spec: &CommandSpec) -> ProcessBuilder {
    ProcessBuilder::new(&spec.program).args(&spec.args)
}
