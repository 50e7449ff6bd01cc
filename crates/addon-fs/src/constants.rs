//! Well-known file and directory names of an addon root.

/// Standard names used under an addon root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonPath {
    /// The registry store of installed addons
    RegistryFile,
    /// Per-addon descriptor listing declared dependencies
    Descriptor,
    /// Slot used when an install does not name one
    DefaultSlot,
    /// Addon root relative to the user's home directory
    DefaultAddonDir,
    /// Manager configuration file
    ConfigFile,
}

impl AddonPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistryFile => "installed.toml",
            Self::Descriptor => "addon.toml",
            Self::DefaultSlot => "main",
            Self::DefaultAddonDir => ".addons",
            Self::ConfigFile => "config.toml",
        }
    }
}

impl std::fmt::Display for AddonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
