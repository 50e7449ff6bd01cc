//! Error types for addon-registry

use std::path::PathBuf;

/// Errors that can occur in registry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was empty or not a safe identifier.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The store exists but cannot be parsed.
    #[error("addon registry at {path} is corrupt: {message}")]
    RegistryCorrupt { path: PathBuf, message: String },

    #[error(transparent)]
    Meta(#[from] addon_meta::Error),

    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;
