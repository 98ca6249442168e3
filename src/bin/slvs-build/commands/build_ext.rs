//! `slvs-build build-ext` command

use std::path::Path;

use anyhow::Result;

use crate::cli::BuildExtArgs;
use crate::commands::load_project;
use slvs_build::ops::{build_ext, BuildExtOptions, StagingState};
use slvs_build::ToolchainFamily;

pub fn execute(args: BuildExtArgs, project_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let project = load_project(project_dir)?;

    let compiler = args
        .compiler
        .as_deref()
        .map(str::parse::<ToolchainFamily>)
        .transpose()?;

    let opts = BuildExtOptions {
        compiler,
        python: args.python,
        jobs: args.jobs,
        dry_run: args.dry_run,
        inplace: args.inplace,
        emit_compile_commands: args.emit_compile_commands,
        verbose,
    };

    let result = build_ext(&project, &opts)?;

    if result.staging == StagingState::StagedExternally {
        tracing::info!("Sources were already staged and were left in place");
    }
    for artifact in &result.artifacts {
        eprintln!("       Built {}", artifact.display());
    }

    Ok(())
}
