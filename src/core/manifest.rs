//! Source manifest of the extension.
//!
//! The manifest is the ordered list of translation units compiled into the
//! single extension module: the binding entry point first, then every native
//! implementation file, then the allocator's implementation files. The order
//! is fixed so builds are reproducible.

use std::path::{Path, PathBuf};

use crate::core::layout::Layout;
use crate::util::config::SourcesConfig;

/// Which part of the extension a translation unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The binding entry point (usually a Cython `.pyx`)
    Binding,
    /// A native solver implementation file
    Native,
    /// A bundled allocator implementation file
    Allocator,
}

/// One translation unit, located under the module root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub kind: SourceKind,
    pub path: PathBuf,
}

/// Ordered sequence of translation units.
#[derive(Debug, Clone)]
pub struct SourceManifest {
    entries: Vec<SourceEntry>,
}

impl SourceManifest {
    /// Build the manifest from the configured unit lists.
    pub fn from_config(layout: &Layout, sources: &SourcesConfig) -> Self {
        let src_dir = layout.src_dir();
        let allocator_src_dir = layout.allocator_src_dir();

        let mut entries = Vec::with_capacity(1 + sources.native.len() + sources.allocator.len());
        entries.push(SourceEntry {
            kind: SourceKind::Binding,
            path: layout.module_root().join(&sources.binding),
        });
        entries.extend(sources.native.iter().map(|unit| SourceEntry {
            kind: SourceKind::Native,
            path: src_dir.join(unit),
        }));
        entries.extend(sources.allocator.iter().map(|unit| SourceEntry {
            kind: SourceKind::Allocator,
            path: allocator_src_dir.join(unit),
        }));

        SourceManifest { entries }
    }

    /// All entries, binding entry first.
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// The binding entry point.
    pub fn binding(&self) -> &Path {
        &self.entries[0].path
    }

    /// Every unit after the binding entry. These are the files copied in from
    /// the external roots at stage time.
    pub fn native_units(&self) -> impl Iterator<Item = &SourceEntry> {
        self.entries.iter().skip(1)
    }

    /// Paths of all translation units, in manifest order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
