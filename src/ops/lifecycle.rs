//! Staging lifecycle around the build and packaging steps.
//!
//! Both hooks make the staging tree exist for the duration of the wrapped
//! step. The build hook reuses a tree that is already present and leaves it
//! alone afterwards; it only removes what it staged itself. The package hook
//! always stages so the archive reflects the current external sources.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::manifest::SourceManifest;
use crate::ops::stage::{stage_sources, teardown, StageReport};

/// Who owns the staging tree during a hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingState {
    /// No tree present
    Unstaged,
    /// This invocation created the tree and is responsible for removing it
    StagedByUs,
    /// The tree was already there; it is never touched
    StagedExternally,
}

/// Steps a hook passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstaged,
    Staging,
    Built,
    Archived,
    TornDown,
    LeftInPlace,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Unstaged => "unstaged",
            Phase::Staging => "staging",
            Phase::Built => "built",
            Phase::Archived => "archived",
            Phase::TornDown => "torn down",
            Phase::LeftInPlace => "left in place",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a hook invocation.
#[derive(Debug)]
pub struct HookReport<T> {
    /// Ownership of the tree while the wrapped step ran
    pub staging: StagingState,
    /// Phases passed through
    pub phases: Vec<Phase>,
    /// Present when this invocation staged
    pub stage: Option<StageReport>,
    /// What the wrapped step produced
    pub output: T,
}

impl<T> HookReport<T> {
    /// Whether the staging tree was removed at the end.
    pub fn torn_down(&self) -> bool {
        self.phases.contains(&Phase::TornDown)
    }
}

/// Compiles the extension from a staged tree.
pub trait ExtensionBackend {
    /// Build and return the produced artifacts.
    fn build(&mut self, dry_run: bool) -> Result<Vec<PathBuf>>;
}

impl<F> ExtensionBackend for F
where
    F: FnMut(bool) -> Result<Vec<PathBuf>>,
{
    fn build(&mut self, dry_run: bool) -> Result<Vec<PathBuf>> {
        self(dry_run)
    }
}

/// Packs the staged tree into a source archive.
pub trait SourceArchiver {
    /// Write the archive and return its path.
    fn archive(&mut self, dry_run: bool) -> Result<PathBuf>;
}

impl<F> SourceArchiver for F
where
    F: FnMut(bool) -> Result<PathBuf>,
{
    fn archive(&mut self, dry_run: bool) -> Result<PathBuf> {
        self(dry_run)
    }
}

/// Run `backend` with the staging tree present.
///
/// An existing tree is used as-is with no filesystem writes. Otherwise the
/// tree is staged first and removed after a successful build. A backend
/// failure propagates without teardown.
pub fn run_build_hook(
    layout: &Layout,
    manifest: &SourceManifest,
    backend: &mut dyn ExtensionBackend,
    dry_run: bool,
) -> Result<HookReport<Vec<PathBuf>>> {
    let mut phases = vec![Phase::Unstaged];

    let (staging, stage) = if layout.is_staged() {
        tracing::info!(
            "Using sources already staged in {}",
            layout.module_root().display()
        );
        (StagingState::StagedExternally, None)
    } else {
        phases.push(Phase::Staging);
        let report = stage_sources(layout, manifest, dry_run)?;
        (StagingState::StagedByUs, Some(report))
    };

    let output = backend.build(dry_run)?;
    phases.push(Phase::Built);

    if staging == StagingState::StagedByUs {
        teardown(layout, dry_run)?;
        phases.push(Phase::TornDown);
    } else {
        phases.push(Phase::LeftInPlace);
    }

    Ok(HookReport {
        staging,
        phases,
        stage,
        output,
    })
}

/// Run `archiver` over a freshly staged tree.
///
/// Staging always happens. The tree is removed afterwards unless `keep_temp`.
pub fn run_package_hook(
    layout: &Layout,
    manifest: &SourceManifest,
    archiver: &mut dyn SourceArchiver,
    dry_run: bool,
    keep_temp: bool,
) -> Result<HookReport<PathBuf>> {
    let mut phases = vec![Phase::Unstaged, Phase::Staging];
    let stage = stage_sources(layout, manifest, dry_run)?;

    let output = archiver.archive(dry_run)?;
    phases.push(Phase::Archived);

    if keep_temp {
        tracing::info!("Keeping staged sources in {}", layout.module_root().display());
        phases.push(Phase::LeftInPlace);
    } else {
        teardown(layout, dry_run)?;
        phases.push(Phase::TornDown);
    }

    Ok(HookReport {
        staging: StagingState::StagedByUs,
        phases,
        stage: Some(stage),
        output,
    })
}
