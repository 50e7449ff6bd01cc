//! The list command

use addon_manager::ManagerConfig;
use colored::Colorize;

use crate::error::Result;

/// Print registry records, optionally only the API-compatible ones.
pub fn run_list(config: &ManagerConfig, compatible: bool, json: bool) -> Result<()> {
    let registry = config.open_registry();
    let entries = if compatible {
        registry.list_by_api_compatible_version(&config.runtime_version)?
    } else {
        registry.list_installed()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No addons installed in {}", config.addon_dir.display());
        return Ok(());
    }

    println!("{}", "Installed Addons".bold());
    println!();
    for entry in &entries {
        println!(
            "  {:<40} {:<16} {}",
            entry.name.green(),
            entry.api_version,
            entry.slot.dimmed()
        );
    }
    println!();
    println!("{} {}", "Total:".dimmed(), entries.len());
    Ok(())
}
