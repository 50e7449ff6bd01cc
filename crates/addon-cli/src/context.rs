//! Effective configuration from the config file plus command-line overrides.

use addon_manager::ManagerConfig;
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Load the config file named by `--config` (or the platform default) and
/// apply flag overrides on top.
pub fn load_config(cli: &Cli) -> Result<ManagerConfig> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => ManagerConfig::default_path(),
    };

    let mut config = match &path {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };
    debug!(path = ?path, "Loaded configuration");

    if let Some(dir) = &cli.addon_dir {
        config.addon_dir = dir.clone();
    }
    if let Some(repository) = &cli.repository {
        config.repository = Some(repository.clone());
    }
    if let Some(runtime) = &cli.runtime_version {
        config.runtime_version = runtime.clone();
    }

    if config.addon_dir.as_os_str().is_empty() {
        return Err(CliError::user("addon directory is empty"));
    }
    Ok(config)
}
