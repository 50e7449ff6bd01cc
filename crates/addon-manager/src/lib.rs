//! Addon install planning and execution.
//!
//! ```text
//!                 addon-cli
//!                     |
//!               addon-manager
//!                     |
//!     +---------------+---------------+
//!     |               |               |
//! addon-resolver  addon-registry  addon-meta
//!                     |
//!                  addon-fs
//! ```
//!
//! [`AddonManager::install`] resolves a target into an [`InstallRequest`];
//! [`InstallRequest::perform`] copies artifacts into the addon directory and
//! records each addon in the registry.

pub mod config;
pub mod error;
pub mod manager;
pub mod request;

pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use manager::AddonManager;
pub use request::{InstallReport, InstallRequest, InstallState};
