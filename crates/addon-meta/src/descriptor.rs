//! The per-addon descriptor file, `addon.toml`.
//!
//! ```toml
//! [[dependency]]
//! name = "org.example:core"
//! version = "[1.0.0,2.0.0)"
//! api-version = "2.0.0"
//! exported = true
//!
//! [[dependency]]
//! name = "org.example:extras"
//! min-version = "1.1.0"
//! optional = true
//! ```
//!
//! `min-version` / `max-version` are an inclusive alternative to `version`.
//! A dependency with neither matches any version.

use std::path::Path;

use addon_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dependency::DependencyEntry;
use crate::error::{Error, Result};
use crate::id::validate_name;
use crate::range::VersionRange;
use crate::version::Version;

/// Parsed contents of an addon descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddonDescriptor {
    pub dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorFile {
    #[serde(default, rename = "dependency", skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<DependencyRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DependencyRecord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<VersionRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<Version>,
    #[serde(default, skip_serializing_if = "is_false")]
    exported: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    optional: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl DependencyRecord {
    fn into_entry(self) -> Result<DependencyEntry> {
        validate_name(&self.name)?;
        let version_range = match (self.version, self.min_version, self.max_version) {
            (Some(range), None, None) => range,
            (Some(_), _, _) => {
                return Err(Error::InvalidRange {
                    input: self.name,
                    reason: "'version' cannot be combined with 'min-version'/'max-version'"
                        .to_string(),
                });
            }
            (None, min, max) => VersionRange::between(min, max)?,
        };

        Ok(DependencyEntry {
            name: self.name,
            version_range,
            api_version: self.api_version,
            exported: self.exported,
            optional: self.optional,
        })
    }

    fn from_entry(entry: &DependencyEntry) -> Self {
        Self {
            name: entry.name.clone(),
            version: (!entry.version_range.is_any()).then(|| entry.version_range.clone()),
            min_version: None,
            max_version: None,
            api_version: entry.api_version.clone(),
            exported: entry.exported,
            optional: entry.optional,
        }
    }
}

impl AddonDescriptor {
    pub fn new(dependencies: Vec<DependencyEntry>) -> Self {
        Self { dependencies }
    }

    /// Parse descriptor TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: DescriptorFile = toml::from_str(content)?;
        let dependencies = file
            .dependencies
            .into_iter()
            .map(DependencyRecord::into_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { dependencies })
    }

    pub fn to_toml(&self) -> Result<String> {
        let file = DescriptorFile {
            dependencies: self.dependencies.iter().map(DependencyRecord::from_entry).collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| Error::DescriptorSerialize(e.to_string()))
    }

    /// Load a descriptor, returning `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match io::read_text(&NormalizedPath::new(path)) {
            Ok(content) => {
                let descriptor = Self::from_toml(&content)?;
                debug!(
                    path = %path.display(),
                    dependencies = descriptor.dependencies.len(),
                    "Loaded addon descriptor"
                );
                Ok(Some(descriptor))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically write the descriptor to `path`.
    pub fn save(&self, path: &Path, config: io::RobustnessConfig) -> Result<()> {
        let content = self.to_toml()?;
        io::write_atomic(&NormalizedPath::new(path), content.as_bytes(), config)?;
        Ok(())
    }
}
