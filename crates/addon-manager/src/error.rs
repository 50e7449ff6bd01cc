//! Error types for addon-manager

use addon_meta::AddonId;

use crate::request::InstallState;

/// Result type for addon-manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in addon-manager operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required install step failed; earlier steps are left in place.
    #[error(
        "installing {failed} failed after {} addon(s) were installed: {source}",
        .completed.len()
    )]
    PartialInstall {
        failed: AddonId,
        completed: Vec<AddonId>,
        #[source]
        source: Box<Error>,
    },

    /// `perform` was called on a request that already ran.
    #[error("install request is already {state}")]
    InvalidState { state: InstallState },

    /// No addon repository is configured.
    #[error("no addon repository configured; set `repository` or pass --repository")]
    NoRepository,

    #[error(transparent)]
    Resolver(#[from] addon_resolver::Error),

    #[error(transparent)]
    Registry(#[from] addon_registry::Error),

    #[error(transparent)]
    Meta(#[from] addon_meta::Error),

    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}
