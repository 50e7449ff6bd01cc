//! Registry records and lookups.

use serde::{Deserialize, Serialize};

/// One installed addon as persisted in the registry store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryEntry {
    pub name: String,
    pub api_version: String,
    pub slot: String,
}

impl RegistryEntry {
    pub fn new(
        name: impl Into<String>,
        api_version: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_version: api_version.into(),
            slot: slot.into(),
        }
    }
}

/// Lookup by name with optional API version and slot filters.
///
/// An absent filter matches any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonQuery {
    pub name: String,
    pub api_version: Option<String>,
    pub slot: Option<String>,
}

impl AddonQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    pub fn matches(&self, entry: &RegistryEntry) -> bool {
        entry.name == self.name
            && self.api_version.as_ref().is_none_or(|v| *v == entry.api_version)
            && self.slot.as_ref().is_none_or(|s| *s == entry.slot)
    }
}

/// On-disk shape of the store: `[[addon]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RegistryFile {
    #[serde(default, rename = "addon")]
    pub(crate) addons: Vec<RegistryEntry>,
}
