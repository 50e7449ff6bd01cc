//! The remove command

use addon_manager::ManagerConfig;
use addon_registry::AddonQuery;
use colored::Colorize;

use crate::error::{CliError, Result};

/// Remove the registry record for `name`. Files on disk are left alone.
pub fn run_remove(config: &ManagerConfig, name: &str) -> Result<()> {
    let registry = config.open_registry();
    let entry = registry
        .get(&AddonQuery::new(name))?
        .ok_or_else(|| CliError::user(format!("addon '{name}' is not installed")))?;

    registry.remove(&entry)?;
    println!(
        "{} {} {}",
        "Removed".green().bold(),
        entry.name,
        entry.api_version
    );
    Ok(())
}
