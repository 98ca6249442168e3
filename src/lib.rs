//! slvs-build - build and packaging orchestrator for the Solvespace Python
//! extension.
//!
//! This crate stages the native solver and allocator sources into the
//! package tree, selects compiler flags for the detected toolchain, compiles
//! the Cython binding and native units into one extension module, and packs
//! source distributions.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{find_version, Extension, Layout, Project, SourceManifest};
pub use builder::{select_toolchain_flags, FlagProfile, ToolchainError, ToolchainFamily};
pub use util::Config;
