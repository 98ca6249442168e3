//! `slvs-build version` command

use std::path::Path;

use anyhow::Result;

use crate::commands::load_project;

pub fn execute(project_dir: Option<&Path>) -> Result<()> {
    let project = load_project(project_dir)?;
    println!("{}", project.version()?);
    Ok(())
}
