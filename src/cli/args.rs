//! CLI argument definitions using clap
//!
//! Commands:
//! - comanda init --config <path>
//! - comanda serve --config <path>
//! - comanda seed --config <path>
//! - comanda admin --config <path> --email <email> --password <pw>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Comanda - restaurant ordering backend
#[derive(Parser, Debug)]
#[command(name = "comanda")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file and create the database
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./comanda.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./comanda.json")]
        config: PathBuf,
    },

    /// Load the demo dataset into the database
    Seed {
        /// Path to configuration file
        #[arg(long, default_value = "./comanda.json")]
        config: PathBuf,
    },

    /// Create an Owner account
    Admin {
        /// Path to configuration file
        #[arg(long, default_value = "./comanda.json")]
        config: PathBuf,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Display name for the account
        #[arg(long, default_value = "Owner")]
        name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
