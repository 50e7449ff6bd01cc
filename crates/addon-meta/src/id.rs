//! Addon identity: a `group:name` coordinate plus a [`Version`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::Version;

/// Identity of one addon release.
///
/// The textual form is `group:name,version`, e.g.
/// `org.example:git-tools,1.2.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddonId {
    name: String,
    version: Version,
}

impl AddonId {
    pub fn new(name: impl Into<String>, version: Version) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, version })
    }

    /// Parse `group:name,version`.
    pub fn from_coordinates(coordinates: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidCoordinates {
            input: coordinates.to_string(),
            reason: reason.to_string(),
        };

        let (name, version) = coordinates
            .trim()
            .split_once(',')
            .ok_or_else(|| invalid("expected 'group:name,version'"))?;
        let version = Version::parse(version.trim())?;
        validate_name(name.trim()).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            name: name.trim().to_string(),
            version,
        })
    }

    pub fn to_coordinates(&self) -> String {
        format!("{},{}", self.name, self.version)
    }

    /// Full `group:name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The part of the name before `:`.
    pub fn group(&self) -> &str {
        self.name.split_once(':').map(|(g, _)| g).unwrap_or_default()
    }

    /// The part of the name after `:`.
    pub fn simple_name(&self) -> &str {
        self.name.split_once(':').map(|(_, n)| n).unwrap_or(&self.name)
    }
}

/// Check that `name` is a `group:name` coordinate.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(',') || name.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain ',' or whitespace"));
    }
    match name.split_once(':') {
        Some((group, simple)) if !group.is_empty() && !simple.is_empty() && !simple.contains(':') => {
            Ok(())
        }
        _ => Err(invalid("expected 'group:name'")),
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.name, self.version)
    }
}

impl FromStr for AddonId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_coordinates(s)
    }
}

impl TryFrom<String> for AddonId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_coordinates(&value)
    }
}

impl From<AddonId> for String {
    fn from(value: AddonId) -> Self {
        value.to_coordinates()
    }
}
