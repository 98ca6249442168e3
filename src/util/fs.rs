//! Filesystem utilities.
//!
//! Every mutating helper takes a `dry_run` flag. In dry-run mode the action is
//! logged and reported as if it happened, but the disk is left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Create a directory and its parents. Returns `true` if it had to be created.
pub fn mkpath(path: &Path, dry_run: bool) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }

    tracing::debug!("creating {}", path.display());
    if !dry_run {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(true)
}

/// Copy a single file, overwriting the destination.
///
/// The destination's parent directory must already exist.
pub fn copy_file(src: &Path, dst: &Path, dry_run: bool) -> Result<()> {
    tracing::debug!("copying {} -> {}", src.display(), dst.display());
    if dry_run {
        if !src.is_file() {
            bail!("can't copy {}: doesn't exist or not a regular file", src.display());
        }
        return Ok(());
    }

    fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Recursively copy every file under `src` into `dst`, merging with whatever
/// `dst` already contains. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, dry_run: bool) -> Result<usize> {
    if !src.is_dir() {
        bail!("cannot copy tree {}: not a directory", src.display());
    }

    mkpath(dst, dry_run)?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} escaped {}", entry.path().display(), src.display()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            mkpath(&target, dry_run)?;
        } else {
            copy_file(entry.path(), &target, dry_run)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove a directory and all its contents, if it exists.
/// Returns `true` if something was removed.
pub fn remove_tree(path: &Path, dry_run: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    tracing::debug!("removing {}", path.display());
    if !dry_run {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(true)
}

/// Create an empty file if it doesn't exist. Existing content is kept.
pub fn touch(path: &Path, dry_run: bool) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    tracing::debug!("creating empty {}", path.display());
    if !dry_run {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to create file: {}", path.display()))?;
    }
    Ok(true)
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        mkpath(parent, false)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find files matching glob patterns anywhere below a base directory.
///
/// Patterns are matched against file names, so `*.pyi` finds stubs in every
/// subpackage.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join("**").join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
