//! Core data structures.
//!
//! - The staging tree layout and its external source roots
//! - The ordered source manifest
//! - The extension descriptor and package metadata
//! - Project discovery and version lookup

pub mod extension;
pub mod layout;
pub mod manifest;
pub mod metadata;
pub mod project;
pub mod version;

pub use extension::{CythonDirectives, Extension, Language};
pub use layout::Layout;
pub use manifest::{SourceEntry, SourceKind, SourceManifest};
pub use metadata::PackageMetadata;
pub use project::Project;
pub use version::{find_version, read_version, VersionError};
