//! Durable registry of installed addons.

pub mod entry;
pub mod error;
pub mod registry;

pub use entry::{AddonQuery, RegistryEntry};
pub use error::{Error, Result};
pub use registry::AddonRegistry;
