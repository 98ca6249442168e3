//! Build executor with progress reporting.

use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::native::NativeBuilder;
use crate::builder::plan::ExtensionPlan;
use crate::builder::toolchain::Toolchain;

/// Build executor with progress tracking.
pub struct BuildExecutor<'a> {
    toolchain: &'a dyn Toolchain,
    verbose: bool,
    dry_run: bool,
}

impl<'a> BuildExecutor<'a> {
    /// Create a new build executor.
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        BuildExecutor {
            toolchain,
            verbose: false,
            dry_run: false,
        }
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Print commands instead of running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute a build plan with progress reporting.
    pub fn execute(&self, plan: &ExtensionPlan, jobs: Option<usize>) -> Result<()> {
        let start = Instant::now();

        if self.verbose {
            eprintln!("   Compiling {} file(s)", plan.compile_count());
        }

        // One tick per translation unit plus one for the link
        let total = plan.compile_count() + 1;
        let pb = if !self.verbose && !self.dry_run && total > 1 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut builder = NativeBuilder::new(self.toolchain).dry_run(self.dry_run);
        if let Some(ref pb) = pb {
            builder = builder.with_progress(pb.clone());
        }
        let compiled = builder.execute(plan, jobs)?;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let elapsed = start.elapsed();
        eprintln!(
            "    Finished {} ({} of {} unit(s) compiled) in {:.2}s",
            plan.output().display(),
            compiled,
            plan.compile_count(),
            elapsed.as_secs_f64()
        );

        Ok(())
    }
}
