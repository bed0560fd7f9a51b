//! Configuration loading

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use taskgate_auth::AuthSettings;
use tracing::{info, warn};

/// Placeholder secret shipped in the defaults; a warning is logged when it is in use
const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection string
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite:./data/taskgate.db?mode=rwc".to_string()
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_access_token_expire_minutes() -> i64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Values taken from the command line or environment, applied over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub secret_key: Option<String>,
    pub access_token_expire_minutes: Option<i64>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Apply command line / environment overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(secret) = overrides.secret_key {
            self.auth.secret_key = secret;
        }
        if let Some(minutes) = overrides.access_token_expire_minutes {
            self.auth.access_token_expire_minutes = minutes;
        }
        self
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            bail!("auth.secret_key must not be empty");
        }
        // Upper bound keeps chrono::Duration::minutes in range
        if !(1..=525_600).contains(&self.auth.access_token_expire_minutes) {
            bail!(
                "auth.access_token_expire_minutes must be between 1 and 525600, got {}",
                self.auth.access_token_expire_minutes
            );
        }
        if self.auth.secret_key == DEFAULT_SECRET_KEY {
            warn!("Using the default signing secret; set SECRET_KEY in production");
        }
        Ok(())
    }

    /// Signing settings handed to the token issuer
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            secret_key: self.auth.secret_key.clone(),
            access_token_expire_minutes: self.auth.access_token_expire_minutes,
        }
    }
}
