//! Dependency edges declared by an addon.

use std::hash::{Hash, Hasher};

use crate::range::VersionRange;
use crate::version::Version;

/// One declared dependency of an owning addon.
///
/// Equality and hashing use the target name only, so a set of entries holds
/// at most one constraint per dependency name.
#[derive(Debug, Clone)]
pub struct DependencyEntry {
    /// Target `group:name`.
    pub name: String,
    pub version_range: VersionRange,
    /// Minimum runtime API the dependency needs, if declared.
    pub api_version: Option<Version>,
    /// Capabilities propagate to the owner's consumers.
    pub exported: bool,
    /// Failure to satisfy this entry does not block the owner.
    pub optional: bool,
}

impl DependencyEntry {
    pub fn new(name: impl Into<String>, version_range: VersionRange) -> Self {
        Self {
            name: name.into(),
            version_range,
            api_version: None,
            exported: false,
            optional: false,
        }
    }

    pub fn with_api_version(mut self, api_version: Version) -> Self {
        self.api_version = Some(api_version);
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Whether the declared API floor (if any) runs on `runtime`.
    pub fn is_api_compatible_with(&self, runtime: &Version) -> bool {
        self.api_version
            .as_ref()
            .is_none_or(|api| runtime.is_api_compatible(api))
    }
}

impl PartialEq for DependencyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DependencyEntry {}

impl Hash for DependencyEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
