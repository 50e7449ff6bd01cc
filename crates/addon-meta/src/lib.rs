//! Addon metadata model.
//!
//! Versions and version ranges, addon identities, declared dependency
//! entries, and the `addon.toml` descriptor each addon carries.

pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod id;
pub mod range;
pub mod version;

pub use dependency::DependencyEntry;
pub use descriptor::AddonDescriptor;
pub use error::{Error, Result};
pub use id::{AddonId, validate_name};
pub use range::{Bound, VersionRange};
pub use version::{Version, is_api_compatible, is_api_compatible_str};
