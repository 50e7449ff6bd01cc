//! Filesystem primitives for the addon manager
//!
//! Provides path normalization, atomic writes guarded by sidecar locks,
//! content checksums, and a format-agnostic config store.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::AddonPath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_path_identifier};
