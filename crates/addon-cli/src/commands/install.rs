//! The install command

use addon_manager::{AddonManager, ManagerConfig};
use addon_meta::AddonId;
use colored::Colorize;

use crate::error::Result;

/// Resolve `target`, print the plan, and perform it unless `dry_run`.
pub fn run_install(config: &ManagerConfig, target: &AddonId, dry_run: bool) -> Result<()> {
    let manager = AddonManager::from_config(config)?;
    let mut request = manager.install(target)?;

    println!("{} {}", "Plan for".bold(), target.to_string().cyan());
    print_section("Required", request.required_addons());
    print_section("Optional", request.optional_addons());
    print_section("Already installed", request.already_installed());
    for exclusion in request.excluded() {
        println!(
            "  {} {} (needs API {}, runtime is {})",
            "excluded".yellow(),
            exclusion.entry.name,
            exclusion
                .entry
                .api_version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            manager.runtime()
        );
    }

    if dry_run {
        println!();
        println!("{} nothing was installed", "[dry-run]".dimmed());
        return Ok(());
    }

    let report = request.perform()?;
    println!();
    for id in report.installed.iter().chain(&report.optional_installed) {
        println!("  {} {}", "+".green().bold(), id);
    }
    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    println!(
        "{} {} addon(s) installed into {}",
        "Done.".green().bold(),
        report.installed.len() + report.optional_installed.len(),
        config.addon_dir.display()
    );
    Ok(())
}

fn print_section(label: &str, ids: &[AddonId]) {
    if ids.is_empty() {
        return;
    }
    println!("{}:", label.bold());
    for id in ids {
        println!("  {:<40} {}", id.name().green(), id.version());
    }
}
