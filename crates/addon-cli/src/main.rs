//! Addon manager CLI
//!
//! Resolves addon dependencies against a repository and installs them into
//! an addon directory.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command.clone() else {
        println!("{} Addon manager CLI", "addon".green().bold());
        println!();
        println!("Run {} for available commands.", "addon --help".cyan());
        return Ok(());
    };

    let config = context::load_config(&cli)?;
    match command {
        Commands::Install {
            coordinates,
            dry_run,
        } => commands::run_install(&config, &coordinates, dry_run),
        Commands::List { compatible, json } => commands::run_list(&config, compatible, json),
        Commands::Remove { name } => commands::run_remove(&config, &name),
        Commands::Info { name } => commands::run_info(&config, &name),
    }
}
