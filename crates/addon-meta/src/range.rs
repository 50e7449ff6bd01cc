//! Version ranges in bracket notation.
//!
//! | Text              | Meaning                 |
//! |-------------------|-------------------------|
//! | `1.0.0`, `[1.0.0]`| exactly 1.0.0           |
//! | `[1.0.0,2.0.0)`   | 1.0.0 <= v < 2.0.0      |
//! | `(1.0.0,2.0.0]`   | 1.0.0 < v <= 2.0.0      |
//! | `[1.0.0,)`        | v >= 1.0.0              |
//! | `(,2.0.0]`        | v <= 2.0.0              |
//! | `(,)`             | any version             |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::Version;

/// One end of an interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// A constraint over [`Version`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionRange {
    /// Exactly one version.
    Exact(Version),
    /// An interval; a missing bound is unbounded on that side.
    Interval {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

impl VersionRange {
    /// The range matching every version.
    pub fn any() -> Self {
        Self::Interval {
            lower: None,
            upper: None,
        }
    }

    pub fn exact(version: Version) -> Self {
        Self::Exact(version)
    }

    /// Build an inclusive interval from optional bounds.
    pub fn between(min: Option<Version>, max: Option<Version>) -> Result<Self> {
        Self::interval(min.map(Bound::inclusive), max.map(Bound::inclusive))
    }

    /// Build an interval, rejecting `lower > upper`.
    ///
    /// Equal bounds with an exclusive end, such as `[1.0.0,1.0.0)`, form an
    /// empty range that no version satisfies.
    pub fn interval(lower: Option<Bound>, upper: Option<Bound>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            if lo.version > hi.version {
                let range = Self::Interval {
                    lower: lower.clone(),
                    upper: upper.clone(),
                };
                return Err(Error::InvalidRange {
                    input: range.to_string(),
                    reason: "lower bound exceeds upper bound".to_string(),
                });
            }
        }
        Ok(Self::Interval { lower, upper })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRange {
            input: text.to_string(),
            reason: reason.to_string(),
        };
        let version = |part: &str| -> Result<Option<Version>> {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                Version::parse(part).map(Some).map_err(|e| invalid(&e.to_string()))
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty range"));
        }

        let first = trimmed.chars().next().unwrap_or_default();
        let last = trimmed.chars().last().unwrap_or_default();
        if !matches!(first, '[' | '(') {
            let exact = version(trimmed)?.ok_or_else(|| invalid("empty range"))?;
            return Ok(Self::Exact(exact));
        }
        if !matches!(last, ']' | ')') || trimmed.len() < 2 {
            return Err(invalid("unterminated range"));
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        match inner.split_once(',') {
            None => {
                if first != '[' || last != ']' {
                    return Err(invalid("a single version must use inclusive brackets"));
                }
                let exact = version(inner)?.ok_or_else(|| invalid("empty range"))?;
                Ok(Self::Exact(exact))
            }
            Some((lo, hi)) => {
                if hi.contains(',') {
                    return Err(invalid("expected at most two bounds"));
                }
                let lower = version(lo)?.map(|v| Bound {
                    version: v,
                    inclusive: first == '[',
                });
                let upper = version(hi)?.map(|v| Bound {
                    version: v,
                    inclusive: last == ']',
                });
                Self::interval(lower, upper).map_err(|_| invalid("lower bound exceeds upper bound"))
            }
        }
    }

    /// Whether `candidate` lies within this range.
    pub fn satisfies(&self, candidate: &Version) -> bool {
        match self {
            Self::Exact(v) => v == candidate,
            Self::Interval { lower, upper } => {
                let above = lower.as_ref().is_none_or(|b| {
                    if b.inclusive {
                        candidate >= &b.version
                    } else {
                        candidate > &b.version
                    }
                });
                let below = upper.as_ref().is_none_or(|b| {
                    if b.inclusive {
                        candidate <= &b.version
                    } else {
                        candidate < &b.version
                    }
                });
                above && below
            }
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(
            self,
            Self::Interval {
                lower: None,
                upper: None
            }
        )
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl From<Version> for VersionRange {
    fn from(version: Version) -> Self {
        Self::Exact(version)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "[{v}]"),
            Self::Interval { lower, upper } => {
                match lower {
                    Some(b) => write!(f, "{}{}", if b.inclusive { '[' } else { '(' }, b.version)?,
                    None => f.write_str("(")?,
                }
                f.write_str(",")?;
                match upper {
                    Some(b) => write!(f, "{}{}", b.version, if b.inclusive { ']' } else { ')' }),
                    None => f.write_str(")"),
                }
            }
        }
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(value: VersionRange) -> Self {
        value.to_string()
    }
}
