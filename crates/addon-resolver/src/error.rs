use std::path::PathBuf;

/// Errors raised while resolving addon metadata and dependencies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required dependency has no version satisfying its constraint.
    #[error(
        "cannot resolve dependency '{dependency}' {constraint} of {addon}: {reason}"
    )]
    DependencyResolution {
        addon: String,
        dependency: String,
        constraint: String,
        reason: String,
    },

    /// The requested addon version is not known to the metadata source.
    #[error("addon {addon} is not available")]
    AddonNotFound { addon: String },

    #[error("no artifact for {addon} at {path}")]
    ArtifactNotFound { addon: String, path: PathBuf },

    #[error("addon repository not found: {path}")]
    RepositoryNotFound { path: PathBuf },

    #[error(transparent)]
    Meta(#[from] addon_meta::Error),

    #[error(transparent)]
    Registry(#[from] addon_registry::Error),

    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
