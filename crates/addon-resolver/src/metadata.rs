//! The metadata source consulted during resolution and installation.

use std::path::PathBuf;

use addon_meta::{AddonId, DependencyEntry, Version, VersionRange};

use crate::error::Result;

/// Which addon (and which versions of it) to describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyQuery {
    pub name: String,
    /// `None` means every version.
    pub range: Option<VersionRange>,
}

impl DependencyQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: VersionRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Query for exactly one release.
    pub fn exact(id: &AddonId) -> Self {
        Self::new(id.name()).with_range(VersionRange::exact(id.version().clone()))
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.range.as_ref().is_none_or(|r| r.satisfies(version))
    }
}

/// What a metadata source knows about the addons matching a query.
#[derive(Debug, Clone, Default)]
pub struct DependencyMetadata {
    /// Dependencies declared by the highest matching version.
    pub dependencies: Vec<DependencyEntry>,
    /// Matching versions, ascending.
    pub available_versions: Vec<Version>,
}

/// Source of addon metadata and artifact files.
///
/// Implementations are injected into the resolver and manager; there is no
/// discovery mechanism.
pub trait MetadataResolver: Send + Sync {
    /// Describe the versions of `query.name` that satisfy `query.range`.
    ///
    /// An unknown name yields empty metadata rather than an error.
    fn resolve_dependency_metadata(&self, query: &DependencyQuery) -> Result<DependencyMetadata>;

    /// Local paths of the artifact files making up `id`.
    fn fetch_artifact(&self, id: &AddonId) -> Result<Vec<PathBuf>>;
}
