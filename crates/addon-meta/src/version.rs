//! Addon versions and the API compatibility rule.
//!
//! A version is `MAJOR.MINOR.PATCH` optionally followed by `-` or `.` and a
//! free-form qualifier:
//!
//! ```
//! use addon_meta::Version;
//!
//! let final_release: Version = "2.0.0.Final".parse().unwrap();
//! let snapshot: Version = "2.0.0-SNAPSHOT".parse().unwrap();
//! assert_eq!(final_release.qualifier(), Some("Final"));
//! assert!(Version::new(2, 0, 0) < snapshot);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:([.-])(.+))?$").unwrap());

/// A parsed, immutable addon version.
///
/// Ordering is numeric on major, minor and patch, then lexicographic on the
/// qualifier, where a missing qualifier sorts first. The qualifier separator
/// is kept for display only and never affects equality or ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    qualifier: Option<Qualifier>,
}

#[derive(Debug, Clone)]
struct Qualifier {
    separator: char,
    text: String,
}

impl Version {
    /// Create a version without a qualifier.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            qualifier: None,
        }
    }

    /// Attach a `-`-separated qualifier.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(Qualifier {
            separator: '-',
            text: qualifier.into(),
        });
        self
    }

    /// Parse `MAJOR.MINOR.PATCH[(-|.)QUALIFIER]`.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedVersion {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let captures = VERSION_PATTERN
            .captures(text.trim())
            .ok_or_else(|| malformed("expected MAJOR.MINOR.PATCH with an optional qualifier"))?;

        let number = |idx: usize| -> Result<u64> {
            captures[idx]
                .parse::<u64>()
                .map_err(|_| malformed("numeric component out of range"))
        };

        let qualifier = match (captures.get(4), captures.get(5)) {
            (Some(sep), Some(text)) => Some(Qualifier {
                separator: if sep.as_str() == "." { '.' } else { '-' },
                text: text.as_str().to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            qualifier,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// The qualifier text without its separator, e.g. `SNAPSHOT`.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_ref().map(|q| q.text.as_str())
    }

    /// Whether an addon built against `candidate_api` runs on this runtime.
    ///
    /// Majors must match and the candidate minor must not exceed the runtime
    /// minor. Patch and qualifier are ignored.
    pub fn is_api_compatible(&self, candidate_api: &Version) -> bool {
        candidate_api.major == self.major && candidate_api.minor <= self.minor
    }

    fn sort_key(&self) -> (u64, u64, u64, Option<&str>) {
        (self.major, self.minor, self.patch, self.qualifier())
    }
}

/// Free-function form of [`Version::is_api_compatible`].
pub fn is_api_compatible(runtime: &Version, candidate_api: &Version) -> bool {
    runtime.is_api_compatible(candidate_api)
}

/// Compatibility check on raw version text.
///
/// Returns `false` when either side fails to parse.
pub fn is_api_compatible_str(runtime: &str, candidate_api: &str) -> bool {
    match (Version::parse(runtime), Version::parse(candidate_api)) {
        (Ok(runtime), Ok(candidate)) => runtime.is_api_compatible(&candidate),
        _ => false,
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(q) = &self.qualifier {
            write!(f, "{}{}", q.separator, q.text)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}
