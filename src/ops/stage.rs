//! Staging of external sources into the package tree.
//!
//! The extension must build from a self-contained tree: a source archive is
//! unpacked on machines where the external roots do not exist. Staging copies
//! headers and sources in, teardown removes them again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::layout::Layout;
use crate::core::manifest::SourceManifest;
use crate::util::fs::{copy_file, copy_tree, mkpath, remove_tree, touch};

/// What a staging run did (or, in dry-run mode, would have done).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Files copied into the tree
    pub files_copied: usize,
    /// Directories created
    pub dirs_created: usize,
    /// Whether the empty configuration header was created
    pub placeholder_created: bool,
    pub dry_run: bool,
}

/// Creates directories, counting each one once.
///
/// In a dry run, planned directories and their ancestors count as created.
struct DirMaker {
    dry_run: bool,
    planned: HashSet<PathBuf>,
}

impl DirMaker {
    fn new(dry_run: bool) -> Self {
        DirMaker {
            dry_run,
            planned: HashSet::new(),
        }
    }

    fn make(&mut self, dir: &Path, report: &mut StageReport) -> Result<()> {
        if self.planned.contains(dir) {
            return Ok(());
        }
        if mkpath(dir, self.dry_run)? {
            report.dirs_created += 1;
            if self.dry_run {
                self.planned.extend(dir.ancestors().map(Path::to_path_buf));
            }
        }
        Ok(())
    }
}

/// Only headers and C sources are mirrored from the walked source roots.
fn is_mirrored_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("h") | Some("c")
    )
}

/// Copy the external sources into the staging tree.
///
/// 1. Both header roots are mirrored into `include/`.
/// 2. `.h`/`.c` files of both source roots are mirrored into the tree.
/// 3. Every manifest unit after the binding entry is copied from its external
///    location.
/// 4. An empty `src/platform/config.h` is created.
///
/// Parent directories are created before each copy. Errors propagate as-is;
/// files already copied stay on disk.
pub fn stage_sources(layout: &Layout, manifest: &SourceManifest, dry_run: bool) -> Result<StageReport> {
    let mut report = StageReport {
        dry_run,
        ..StageReport::default()
    };
    let mut dirs = DirMaker::new(dry_run);

    let include_dir = layout.include_dir();
    for header_root in [
        layout.external_include_dir(),
        layout.external_allocator_include_dir(),
    ] {
        dirs.make(&include_dir, &mut report)?;
        report.files_copied += copy_tree(&header_root, &include_dir, dry_run)
            .with_context(|| format!("failed to stage headers from {}", header_root.display()))?;
    }

    for dir in [layout.src_dir(), layout.allocator_src_dir()] {
        dirs.make(&dir, &mut report)?;
    }

    for source_root in [layout.external_src_dir(), layout.external_allocator_src_dir()] {
        for entry in WalkDir::new(&source_root).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("failed to walk {}", source_root.display()))?;
            if !entry.file_type().is_file() || !is_mirrored_source(entry.path()) {
                continue;
            }

            let target = layout.to_local(entry.path()).with_context(|| {
                format!("{} is outside the external root", entry.path().display())
            })?;
            copy_with_parents(entry.path(), &target, &mut dirs, &mut report)?;
        }
    }

    for unit in manifest.native_units() {
        let external = layout.to_external(&unit.path).with_context(|| {
            format!("{} is outside the module root", unit.path.display())
        })?;
        copy_with_parents(&external, &unit.path, &mut dirs, &mut report)?;
    }

    let config_header = layout.config_header();
    if let Some(parent) = config_header.parent() {
        dirs.make(parent, &mut report)?;
    }
    report.placeholder_created = touch(&config_header, dry_run)?;

    tracing::info!(
        "Staged {} files into {}{}",
        report.files_copied,
        layout.module_root().display(),
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(report)
}

fn copy_with_parents(
    src: &Path,
    dst: &Path,
    dirs: &mut DirMaker,
    report: &mut StageReport,
) -> Result<()> {
    if let Some(parent) = dst.parent() {
        dirs.make(parent, report)?;
    }
    copy_file(src, dst, dirs.dry_run)?;
    report.files_copied += 1;
    Ok(())
}

/// Remove the three staged subtrees. Returns how many existed.
pub fn teardown(layout: &Layout, dry_run: bool) -> Result<usize> {
    let mut removed = 0;
    for dir in layout.staged_subtrees() {
        if remove_tree(&dir, dry_run)? {
            removed += 1;
        }
    }
    tracing::info!(
        "Removed {} staged director{}{}",
        removed,
        if removed == 1 { "y" } else { "ies" },
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(removed)
}
