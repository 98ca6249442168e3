//! High-level operations.
//!
//! This module contains the implementation of slvs-build commands.

pub mod build_ext;
pub mod lifecycle;
pub mod sdist;
pub mod stage;

pub use build_ext::{build_ext, BuildExtOptions, BuildExtResult};
pub use lifecycle::{
    run_build_hook, run_package_hook, ExtensionBackend, HookReport, Phase, SourceArchiver,
    StagingState,
};
pub use sdist::{sdist, SdistOptions, SdistResult, TarGzArchiver};
pub use stage::{stage_sources, teardown, StageReport};
