//! The info command

use addon_manager::ManagerConfig;
use addon_registry::AddonQuery;
use colored::Colorize;

use crate::error::{CliError, Result};

pub fn run_info(config: &ManagerConfig, name: &str) -> Result<()> {
    let registry = config.open_registry();
    let entry = registry
        .get(&AddonQuery::new(name))?
        .ok_or_else(|| CliError::user(format!("addon '{name}' is not installed")))?;

    println!("{}", entry.name.bold());
    println!("  {:<14} {}", "api version:".dimmed(), entry.api_version);
    println!("  {:<14} {}", "slot:".dimmed(), entry.slot);
    println!(
        "  {:<14} {}",
        "location:".dimmed(),
        registry.resource_dir(&entry).display()
    );

    let files = registry.get_resource_files(&entry)?;
    println!();
    println!("{} ({})", "Resources".bold(), files.len());
    for file in &files {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {file_name}");
    }

    let dependencies = registry.get_dependency_entries(&entry)?;
    println!();
    println!("{} ({})", "Dependencies".bold(), dependencies.len());
    for dependency in &dependencies {
        let mut flags = Vec::new();
        if dependency.optional {
            flags.push("optional");
        }
        if dependency.exported {
            flags.push("exported");
        }
        let api = dependency
            .api_version
            .as_ref()
            .map(|v| format!(" api {v}"))
            .unwrap_or_default();
        println!(
            "  {} {}{} {}",
            dependency.name.cyan(),
            dependency.version_range,
            api,
            flags.join(", ").dimmed()
        );
    }
    Ok(())
}
