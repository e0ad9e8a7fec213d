//! CLI module for comanda
//!
//! - init: write default config, create the database
//! - serve: boot the HTTP server
//! - seed: load the demo dataset
//! - admin: create an Owner account

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{admin, init, init_tracing, seed_command, serve};
pub use errors::{CliError, CliResult};

/// Parse arguments and dispatch. The binary's whole `main`.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_tracing();

    match cli.command {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::Seed { config } => seed_command(&config),
        Command::Admin {
            config,
            email,
            password,
            name,
        } => admin(&config, &email, &password, &name),
    }
}
