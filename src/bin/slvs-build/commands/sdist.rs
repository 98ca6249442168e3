//! `slvs-build sdist` command

use std::path::Path;

use anyhow::Result;

use crate::cli::SdistArgs;
use crate::commands::load_project;
use slvs_build::ops::{sdist, SdistOptions};
use slvs_build::util::fs::relative_path;

pub fn execute(args: SdistArgs, project_dir: Option<&Path>) -> Result<()> {
    let project = load_project(project_dir)?;

    let opts = SdistOptions {
        dist_dir: args.dist_dir,
        keep_temp: args.keep_temp,
        dry_run: args.dry_run,
    };

    let result = sdist(&project, &opts)?;

    eprintln!(
        "    Packaged {} ({} entries){}",
        relative_path(project.root(), &result.archive).display(),
        result.entries,
        if args.dry_run { " (dry run)" } else { "" }
    );
    if result.kept_tree {
        eprintln!(
            "        Kept staged sources in {}",
            project.layout().module_root().display()
        );
    }

    Ok(())
}
