//! Addon metadata sources and dependency resolution.

pub mod error;
pub mod local;
pub mod metadata;
pub mod resolver;

pub use error::{Error, Result};
pub use local::LocalRepository;
pub use metadata::{DependencyMetadata, DependencyQuery, MetadataResolver};
pub use resolver::{DependencyResolver, Exclusion, Resolution};
