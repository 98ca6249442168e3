//! `slvs-build stage` command
//!
//! Stages the sources once so repeated `build-ext` runs reuse the tree.

use std::path::Path;

use anyhow::Result;

use crate::cli::StageArgs;
use crate::commands::load_project;
use slvs_build::ops::stage_sources;

pub fn execute(args: StageArgs, project_dir: Option<&Path>) -> Result<()> {
    let project = load_project(project_dir)?;
    let layout = project.layout();

    if layout.is_staged() {
        tracing::warn!(
            "{} already holds staged sources; refreshing them",
            layout.module_root().display()
        );
    }

    let report = stage_sources(&layout, &project.manifest(), args.dry_run)?;

    eprintln!(
        "      Staged {} files, {} directories into {}{}",
        report.files_copied,
        report.dirs_created,
        layout.module_root().display(),
        if args.dry_run { " (dry run)" } else { "" }
    );

    Ok(())
}
