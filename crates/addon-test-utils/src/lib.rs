//! Shared test utilities for the addon manager workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`repository`]: [`TestRepository`] builds an on-disk addon repository
//! - [`failing`]: [`FailingResolver`] injects fetch failures

pub mod failing;
pub mod repository;

pub use failing::FailingResolver;
pub use repository::{TestRepository, dep};
