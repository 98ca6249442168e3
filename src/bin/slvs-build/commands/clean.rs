//! `slvs-build clean` command

use std::path::Path;

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::load_project;
use slvs_build::ops::teardown;
use slvs_build::util::fs::remove_tree;

pub fn execute(args: CleanArgs, project_dir: Option<&Path>) -> Result<()> {
    let project = load_project(project_dir)?;
    let layout = project.layout();

    let removed = teardown(&layout, args.dry_run)?;
    eprintln!(
        "     Removed {} staged director{}",
        removed,
        if removed == 1 { "y" } else { "ies" }
    );

    if args.all {
        for dir in [project.build_dir(), project.root().join("dist")] {
            if remove_tree(&dir, args.dry_run)? {
                eprintln!("     Removed {}", dir.display());
            }
        }
    }

    Ok(())
}
