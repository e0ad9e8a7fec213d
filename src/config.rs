//! # Configuration
//!
//! JSON config file with per-field defaults. Secrets can be supplied or
//! overridden through environment variables so the config file can be
//! committed without them.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write config file `{path}`: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub loyalty: LoyaltyConfig,

    #[serde(default)]
    pub push: PushConfig,

    /// Offset of business-local time from UTC, in minutes. Order-number
    /// days and schedule windows roll over at local midnight.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins. Empty means permissive (development).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Override with `COMANDA_JWT_SECRET`.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,

    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,

    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// One point is accrued per this many minor units paid.
    #[serde(default = "default_accrual_divisor")]
    pub accrual_divisor: i64,

    /// Credit value of one redeemed point, in minor units.
    #[serde(default = "default_redemption_value")]
    pub redemption_value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default)]
    pub enabled: bool,

    /// FCM send endpoint.
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,

    /// Server key for the FCM API. Override with `COMANDA_FCM_KEY`.
    #[serde(default)]
    pub server_key: String,
}

fn default_database_path() -> String {
    "./comanda.db".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8420
}

fn default_jwt_secret() -> String {
    "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> i64 {
    15
}

fn default_refresh_ttl() -> i64 {
    30
}

fn default_password_min_length() -> usize {
    8
}

fn default_accrual_divisor() -> i64 {
    1000
}

fn default_redemption_value() -> i64 {
    50
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_utc_offset() -> i32 {
    // Asuncion, no DST since 2024
    -3 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            http: HttpConfig::default(),
            auth: AuthConfig::default(),
            loyalty: LoyaltyConfig::default(),
            push: PushConfig::default(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min_length(),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            accrual_divisor: default_accrual_divisor(),
            redemption_value: default_redemption_value(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_push_endpoint(),
            server_key: String::new(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file, then apply environment overrides.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: AppConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Write the default config to `path` (used by `comanda init`).
    pub fn write_default(path: &Path) -> ConfigResult<Self> {
        let config = AppConfig::default();
        let text = serde_json::to_string_pretty(&config).expect("config serializes");
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = env::var("COMANDA_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(key) = env::var("COMANDA_FCM_KEY") {
            self.push.server_key = key;
        }
        if self.auth.jwt_secret == default_jwt_secret() {
            warn!("jwt_secret is the built-in default; set COMANDA_JWT_SECRET in production");
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8420);
        assert_eq!(config.auth.access_ttl_minutes, 15);
        assert_eq!(config.loyalty.accrual_divisor, 1000);
        assert!(!config.push.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"http": {"port": 9000}}"#).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.database_path, "./comanda.db");
    }

    #[test]
    fn test_socket_addr() {
        let mut config = AppConfig::default();
        config.http.port = 7777;
        assert_eq!(config.socket_addr(), "0.0.0.0:7777");
    }
}
