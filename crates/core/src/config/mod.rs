//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FLICKRS_*)
//! 2. TOML config file (if FLICKRS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FLICKRS_*)
/// 2. TOML config file (if FLICKRS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Flickr API key.
    ///
    /// Set via FLICKRS_API_KEY environment variable or the config file's
    /// `api_key` entry. Required before any remote call.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Flickr API secret, paired with the key.
    ///
    /// Set via FLICKRS_API_SECRET environment variable.
    #[serde(default)]
    pub api_secret: Option<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via FLICKRS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Owner nsid used by tag and album lookups when the caller does not
    /// name one.
    ///
    /// Set via FLICKRS_DEFAULT_USER environment variable.
    #[serde(default)]
    pub default_user: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via FLICKRS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FLICKRS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./flickrs-cache.sqlite")
}

fn default_user_agent() -> String {
    "flickrs/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            db_path: default_db_path(),
            default_user: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FLICKRS_`
    /// 2. TOML file from `FLICKRS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FLICKRS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FLICKRS_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The API credential pair, failing if either half is missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the absent field.
    pub fn require_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self.api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "api_key".into(),
            hint: "Set FLICKRS_API_KEY environment variable".into(),
        })?;
        let secret = self.api_secret.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "api_secret".into(),
            hint: "Set FLICKRS_API_SECRET environment variable".into(),
        })?;
        Ok((key, secret))
    }
}
