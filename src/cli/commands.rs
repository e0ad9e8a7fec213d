//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::crypto::PasswordRules;
use crate::auth::{AuthService, JwtConfig, JwtManager, SessionConfig};
use crate::config::AppConfig;
use crate::db::Db;
use crate::http_server::{AppState, HttpServer};
use crate::seed;

use super::errors::CliResult;

/// Install the tracing subscriber; `RUST_LOG` controls the filter.
pub fn init_tracing() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
}

/// Write the default config and create an empty, migrated database.
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(super::errors::CliError::ConfigExists(
            config_path.display().to_string(),
        ));
    }

    let config = AppConfig::write_default(config_path)?;
    Db::open(Path::new(&config.database_path))?;

    println!("wrote {}", config_path.display());
    println!("created database at {}", config.database_path);
    Ok(())
}

/// Boot the HTTP server and block until shutdown.
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let db = Db::open(Path::new(&config.database_path))?;
    let state = Arc::new(AppState::new(config, db));

    info!("state initialized, starting server");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(HttpServer::new(state).serve())?;
    Ok(())
}

/// Load the demo dataset.
pub fn seed_command(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let db = Db::open(Path::new(&config.database_path))?;
    seed::run(&db)?;
    println!("demo dataset loaded");
    Ok(())
}

/// Create an Owner account for the admin dashboard.
pub fn admin(config_path: &Path, email: &str, password: &str, name: &str) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let db = Db::open(Path::new(&config.database_path))?;

    let auth = AuthService::new(
        db,
        JwtManager::new(JwtConfig {
            secret: config.auth.jwt_secret.clone(),
            access_ttl: chrono::Duration::minutes(config.auth.access_ttl_minutes),
        }),
        SessionConfig {
            refresh_ttl: chrono::Duration::days(config.auth.refresh_ttl_days),
        },
        PasswordRules {
            min_length: config.auth.password_min_length,
        },
    );

    let account = auth.create_owner(email, password, name)?;
    println!("created owner {} ({})", account.email, account.id);
    Ok(())
}
