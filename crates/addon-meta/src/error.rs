/// Errors that can occur in the addon metadata model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Version text does not match `MAJOR.MINOR.PATCH[(-|.)QUALIFIER]`.
    #[error("malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    /// Version range text is not valid bracket notation, or its bounds are inverted.
    #[error("invalid version range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    /// Addon coordinates are not of the form `group:name,version`.
    #[error("invalid addon coordinates '{input}': {reason}")]
    InvalidCoordinates { input: String, reason: String },

    /// Invalid addon name.
    #[error("invalid addon name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Addon descriptor is not valid TOML or has invalid fields.
    #[error("failed to parse addon descriptor: {0}")]
    DescriptorParse(#[from] toml::de::Error),

    /// Failed to serialize an addon descriptor.
    #[error("failed to serialize addon descriptor: {0}")]
    DescriptorSerialize(String),

    /// Filesystem or descriptor parse error.
    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
