//! Implementation of `slvs-build sdist`.
//!
//! The archive is a gzipped tarball whose entries sit under a
//! `<name>-<version>/` prefix: a generated `PKG-INFO`, the project files and
//! the whole package tree including the staged native sources, so the
//! extension can be rebuilt without the external roots.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;

use crate::core::metadata::PackageMetadata;
use crate::core::project::Project;
use crate::ops::lifecycle::{run_package_hook, SourceArchiver};
use crate::util::fs::{glob_files, mkpath};

/// Extensions of build products that never go into a source archive.
const EXCLUDED_EXTENSIONS: &[&str] = &["so", "pyd", "dll", "o", "obj", "fp", "pyc"];

/// Options for the sdist command.
#[derive(Debug, Clone, Default)]
pub struct SdistOptions {
    /// Output directory (default: `<root>/dist`)
    pub dist_dir: Option<PathBuf>,

    /// Keep the staged tree after archiving
    pub keep_temp: bool,

    /// Print what would happen without touching the disk
    pub dry_run: bool,
}

/// What an sdist run produced.
#[derive(Debug, Clone)]
pub struct SdistResult {
    pub archive: PathBuf,
    /// Entries written, PKG-INFO included
    pub entries: usize,
    /// Whether the staged tree was left in place
    pub kept_tree: bool,
}

/// One file to archive: where it is on disk, and its name under the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub name: PathBuf,
}

/// Writes the staged project as `dist/<name>-<version>.tar.gz`.
pub struct TarGzArchiver {
    project_root: PathBuf,
    module_root: PathBuf,
    extra_files: Vec<PathBuf>,
    package_data: Vec<String>,
    metadata: PackageMetadata,
    output: PathBuf,
    entries: usize,
}

impl TarGzArchiver {
    pub fn new(project: &Project, metadata: PackageMetadata, dist_dir: &Path) -> Self {
        let package = &project.config().package;
        let output = dist_dir.join(format!("{}.tar.gz", metadata.dist_name()));
        TarGzArchiver {
            project_root: project.root().to_path_buf(),
            module_root: project.layout().module_root().to_path_buf(),
            extra_files: vec![
                project.config_file(),
                project.root().join(&package.readme),
                project.root().join(&package.requirements),
            ],
            package_data: package.package_data.clone(),
            metadata,
            output,
            entries: 0,
        }
    }

    /// Files to archive, in a stable order.
    ///
    /// Project files come first when present, then every file of the package
    /// tree except caches and build products.
    pub fn collect_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let prefix = PathBuf::from(self.metadata.dist_name());
        let mut entries = Vec::new();

        for file in &self.extra_files {
            if file.is_file() {
                entries.push(self.entry_for(&prefix, file)?);
            }
        }

        let walker = WalkDir::new(&self.module_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != "__pycache__");
        for entry in walker {
            let entry = entry
                .with_context(|| format!("failed to walk {}", self.module_root.display()))?;
            if !entry.file_type().is_file() || is_build_product(entry.path()) {
                continue;
            }
            entries.push(self.entry_for(&prefix, entry.path())?);
        }

        Ok(entries)
    }

    fn entry_for(&self, prefix: &Path, file: &Path) -> Result<ArchiveEntry> {
        let rel = file.strip_prefix(&self.project_root).with_context(|| {
            format!(
                "{} is outside the project root {}",
                file.display(),
                self.project_root.display()
            )
        })?;
        Ok(ArchiveEntry {
            source: file.to_path_buf(),
            name: prefix.join(rel),
        })
    }

    fn write(&self, entries: &[ArchiveEntry]) -> Result<()> {
        if let Some(parent) = self.output.parent() {
            mkpath(parent, false)?;
        }

        let file = File::create(&self.output)
            .with_context(|| format!("failed to create {}", self.output.display()))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let pkg_info = self.metadata.to_pkg_info();
        let mut header = tar::Header::new_gnu();
        header.set_size(pkg_info.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        let pkg_info_name = Path::new(&self.metadata.dist_name()).join("PKG-INFO");
        builder
            .append_data(&mut header, &pkg_info_name, pkg_info.as_bytes())
            .context("failed to add PKG-INFO to archive")?;

        for entry in entries {
            tracing::debug!("adding {}", entry.name.display());
            builder
                .append_path_with_name(&entry.source, &entry.name)
                .with_context(|| format!("failed to add {} to archive", entry.source.display()))?;
        }

        let encoder = builder
            .into_inner()
            .context("failed to finish tar archive")?;
        encoder.finish().context("failed to finish gzip stream")?;
        Ok(())
    }
}

impl SourceArchiver for TarGzArchiver {
    fn archive(&mut self, dry_run: bool) -> Result<PathBuf> {
        let entries = self.collect_entries()?;

        let data = glob_files(&self.module_root, &self.package_data)?;
        if let Some(missing) = data
            .iter()
            .find(|file| !entries.iter().any(|e| &e.source == *file))
        {
            bail!(
                "package data {} matches an excluded build product",
                missing.display()
            );
        }
        tracing::debug!("{} package data file(s) in archive", data.len());

        self.entries = entries.len() + 1;

        if dry_run {
            tracing::info!(
                "Would write {} ({} entries)",
                self.output.display(),
                self.entries
            );
        } else {
            self.write(&entries)?;
        }

        Ok(self.output.clone())
    }
}

fn is_build_product(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| EXCLUDED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Build a source distribution.
///
/// Always stages the native sources into the package tree first, and removes
/// them again afterwards unless `keep_temp` is set.
pub fn sdist(project: &Project, opts: &SdistOptions) -> Result<SdistResult> {
    let config = project.config();
    let version = project.version()?;
    let metadata = PackageMetadata::load(project.root(), &config.package, version)?;

    let dist_dir = opts
        .dist_dir
        .clone()
        .unwrap_or_else(|| project.root().join("dist"));
    let keep_temp = opts.keep_temp || config.build.keep_temp.unwrap_or(false);

    let layout = project.layout();
    let manifest = project.manifest();
    let mut archiver = TarGzArchiver::new(project, metadata, &dist_dir);

    let report = run_package_hook(&layout, &manifest, &mut archiver, opts.dry_run, keep_temp)?;
    let kept_tree = !report.torn_down();

    Ok(SdistResult {
        archive: report.output,
        entries: archiver.entries,
        kept_tree,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use flate2::read::GzDecoder;
    use tar::Archive;

    use super::*;
    use crate::test_support::{SourceTreeFixture, FIXTURE_VERSION};

    fn archive_names(path: &Path) -> BTreeSet<String> {
        let file = File::open(path).unwrap();
        let mut archive = Archive::new(GzDecoder::new(file));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_sdist_contains_staged_tree() {
        let fixture = SourceTreeFixture::new();
        fixture.write_project("python_solvespace/__pycache__/x.pyc", "junk");
        fixture.write_project("python_solvespace/slvs.cpython-38-x86_64-linux-gnu.so", "junk");
        let project = fixture.project();

        let result = sdist(&project, &SdistOptions::default()).unwrap();

        let prefix = format!("python_solvespace-{}", FIXTURE_VERSION);
        assert_eq!(
            result.archive,
            fixture
                .project_root()
                .join("dist")
                .join(format!("{}.tar.gz", prefix))
        );
        assert!(!result.kept_tree);

        let names = archive_names(&result.archive);
        assert_eq!(names.len(), result.entries);
        for expected in [
            "PKG-INFO",
            "README.md",
            "requirements.txt",
            "python_solvespace/__init__.py",
            "python_solvespace/slvs.pyx",
            "python_solvespace/slvs.pyi",
            "python_solvespace/py.typed",
            "python_solvespace/include/slvs.h",
            "python_solvespace/src/util.cpp",
            "python_solvespace/src/platform/config.h",
            "python_solvespace/extlib/mimalloc/src/alloc.c",
        ] {
            assert!(
                names.contains(&format!("{}/{}", prefix, expected)),
                "missing {}",
                expected
            );
        }
        assert!(!names.iter().any(|n| n.contains("__pycache__")));
        assert!(!names.iter().any(|n| n.ends_with(".so")));

        // Staged tree removed again
        assert!(!project.layout().include_dir().exists());
    }

    #[test]
    fn test_sdist_keep_temp() {
        let fixture = SourceTreeFixture::new();
        let project = fixture.project();

        let opts = SdistOptions {
            keep_temp: true,
            ..SdistOptions::default()
        };
        let result = sdist(&project, &opts).unwrap();

        assert!(result.kept_tree);
        assert!(project.layout().is_staged());
    }

    #[test]
    fn test_sdist_dry_run_writes_nothing() {
        let fixture = SourceTreeFixture::new();
        let project = fixture.project();

        let opts = SdistOptions {
            dry_run: true,
            ..SdistOptions::default()
        };
        let result = sdist(&project, &opts).unwrap();

        assert!(!result.archive.exists());
        assert!(!fixture.project_root().join("dist").exists());
        assert!(!project.layout().include_dir().exists());
    }

    #[test]
    fn test_sdist_requires_version() {
        let fixture = SourceTreeFixture::new();
        fixture.write_project("python_solvespace/__init__.py", "VERSION = '1'\n");
        let project = fixture.project();

        let err = sdist(&project, &SdistOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Unable to find version string."));
        assert!(!project.layout().include_dir().exists());
    }

    #[test]
    fn test_package_data_matching_build_product_fails() {
        let fixture = SourceTreeFixture::new();
        fixture.write_project("python_solvespace/slvs.pyd", "junk");
        let mut project = fixture.project();
        project
            .config_mut()
            .package
            .package_data
            .push("*.pyd".to_string());

        let err = sdist(&project, &SdistOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("slvs.pyd"));
        assert!(!fixture
            .project_root()
            .join("dist")
            .join(format!("python_solvespace-{}.tar.gz", FIXTURE_VERSION))
            .exists());
    }

    #[test]
    fn test_build_products_excluded() {
        assert!(is_build_product(Path::new("slvs.cpython-38.so")));
        assert!(is_build_product(Path::new("slvs.pyd")));
        assert!(is_build_product(Path::new("util.o.fp")));
        assert!(!is_build_product(Path::new("slvs.pyx")));
        assert!(!is_build_product(Path::new("py.typed")));
    }
}
