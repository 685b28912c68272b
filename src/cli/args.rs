//! CLI argument definitions using clap
//!
//! Commands:
//! - portal-release plan --config <path>
//! - portal-release release --config <path> [--initials <xx>]
//! - portal-release status --config <path>
//! - portal-release stage --config <path> --package <file> --title <t>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Promote staged portal services into production
#[derive(Parser, Debug)]
#[command(name = "portal-release")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify every configured unit without touching the portal
    Plan {
        /// Path to configuration file
        #[arg(long, default_value = "./portal-release.json")]
        config: PathBuf,
    },

    /// Run the full promotion batch
    Release {
        /// Path to configuration file
        #[arg(long, default_value = "./portal-release.json")]
        config: PathBuf,

        /// Operator initials stamped into release comments; overrides the
        /// config file
        #[arg(long)]
        initials: Option<String>,
    },

    /// Show the production state of every configured unit
    Status {
        /// Path to configuration file
        #[arg(long, default_value = "./portal-release.json")]
        config: PathBuf,
    },

    /// Upload a built package into the staging area
    Stage {
        /// Path to configuration file
        #[arg(long, default_value = "./portal-release.json")]
        config: PathBuf,

        /// Package file to upload
        #[arg(long)]
        package: PathBuf,

        /// Staged item title, e.g. "Roads STAGED"
        #[arg(long)]
        title: String,

        /// Machine name; defaults to the title with underscores
        #[arg(long)]
        name: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
