//! CLI argument parsing using clap derive

use std::path::PathBuf;

use addon_meta::{AddonId, Version};
use clap::{Parser, Subcommand};

/// Addon manager - resolve and install addons with their dependencies
#[derive(Parser, Debug)]
#[command(name = "addon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "ADDON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding installed addons and the registry
    #[arg(long, global = true, env = "ADDON_DIR")]
    pub addon_dir: Option<PathBuf>,

    /// Directory-backed addon repository to install from
    #[arg(long, global = true, env = "ADDON_REPOSITORY")]
    pub repository: Option<PathBuf>,

    /// Runtime version used for API compatibility checks
    #[arg(long, global = true)]
    pub runtime_version: Option<Version>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and install an addon
    ///
    /// Examples:
    ///   addon install org.example:tools,1.2.0
    ///   addon install org.example:tools,1.2.0 --dry-run
    Install {
        /// Addon coordinates, `group:name,version`
        coordinates: AddonId,

        /// Print the plan without installing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List installed addons
    List {
        /// Only addons whose API version runs on the runtime
        #[arg(long)]
        compatible: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Remove an installed addon from the registry
    Remove {
        /// Addon name, `group:name`
        name: String,
    },

    /// Show resources and declared dependencies of an installed addon
    Info {
        /// Addon name, `group:name`
        name: String,
    },
}
