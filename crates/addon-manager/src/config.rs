//! Manager configuration.
//!
//! ```toml
//! addon-dir = "/home/me/.addons"
//! repository = "/srv/addon-repo"
//! runtime-version = "2.1.0"
//! lock-timeout-ms = 5000
//! fsync = true
//! ```
//!
//! Every key is optional. TOML, JSON, and YAML files are accepted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use addon_fs::{AddonPath, ConfigStore, NormalizedPath, RobustnessConfig};
use addon_meta::Version;
use addon_registry::AddonRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Settings for an [`AddonManager`](crate::AddonManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ManagerConfig {
    /// Root of installed addons and the registry store.
    pub addon_dir: PathBuf,
    /// Directory-backed addon repository.
    pub repository: Option<PathBuf>,
    /// Version the API compatibility rule is checked against.
    pub runtime_version: Version,
    pub lock_timeout_ms: u64,
    pub fsync: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let defaults = RobustnessConfig::default();
        Self {
            addon_dir: dirs::home_dir()
                .unwrap_or_default()
                .join(AddonPath::DefaultAddonDir.as_str()),
            repository: None,
            runtime_version: default_runtime_version(),
            lock_timeout_ms: defaults.lock_timeout.as_millis() as u64,
            fsync: defaults.enable_fsync,
        }
    }
}

fn default_runtime_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 1, 0))
}

impl ManagerConfig {
    /// Platform config location, e.g. `~/.config/addon-manager/config.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| {
            d.join("addon-manager")
                .join(AddonPath::ConfigFile.as_str())
        })
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ConfigStore::new().load_optional(&NormalizedPath::new(path))?;
        if config.is_none() {
            debug!(path = %path.display(), "No config file, using defaults");
        }
        Ok(config.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.config_store().save(&NormalizedPath::new(path), self)?;
        Ok(())
    }

    pub fn robustness(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            enable_fsync: self.fsync,
        }
    }

    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::with_robustness(self.robustness())
    }

    /// Registry rooted at `addon_dir`.
    pub fn open_registry(&self) -> AddonRegistry {
        AddonRegistry::with_store(&self.addon_dir, self.config_store())
    }
}
