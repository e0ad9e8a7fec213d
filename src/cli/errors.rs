//! Error types for the CLI.

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::db::DbError;
use crate::seed::SeedError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file `{0}` already exists")]
    ConfigExists(String),
}
