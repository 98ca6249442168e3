//! Command implementations

pub mod build_ext;
pub mod clean;
pub mod completions;
pub mod flags;
pub mod sdist;
pub mod stage;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use slvs_build::Project;

/// Load the project from `-C`, or discover it from the current directory.
pub fn load_project(project_dir: Option<&Path>) -> Result<Project> {
    match project_dir {
        Some(dir) => Project::load(dir),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            Project::discover(&cwd)
        }
    }
}
