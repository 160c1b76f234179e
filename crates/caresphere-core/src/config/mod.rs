//! Gateway configuration.
//!
//! Configuration precedence (later wins):
//! 1. Defaults
//! 2. Global config file (~/.caresphere/config.toml)
//! 3. Local config file (./.caresphererc)
//! 4. Environment variables (`CARESPHERE_API_URL`, `CARESPHERE_SESSION_FILE`)
//! 5. Command-line flags (applied by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "CARESPHERE_API_URL";

/// Environment variable overriding the session file location.
pub const SESSION_FILE_ENV: &str = "CARESPHERE_SESSION_FILE";

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the backend collaborator.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the session is persisted (defaults to ~/.caresphere/session.json).
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: None,
            request_timeout_secs: default_timeout_secs(),
            log_level: None,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Sparse file representation so a local file only overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    log_level: Option<String>,
}

impl GatewayConfig {
    /// Load a configuration file on top of the defaults.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".caresphere")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".caresphererc")
    }

    /// Discover and load configuration files, then apply environment overrides.
    ///
    /// Missing files are skipped. A file that exists but does not parse is an error.
    /// Values are not validated here so that command-line flags can still
    /// replace them; [`GatewayClient::new`](crate::GatewayClient::new) validates.
    pub fn discover_and_load() -> ConfigResult<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            match config.merge_file(&path) {
                Ok(()) | Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Merge the values named in a TOML file into this configuration.
    pub fn merge_file(&mut self, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(session_file) = file.session_file {
            self.session_file = Some(session_file);
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(log_level) = file.log_level {
            self.log_level = Some(log_level);
        }
        Ok(())
    }

    /// Apply overrides from the environment, looked up through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url;
        }
        if let Some(session_file) = lookup(SESSION_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            self.session_file = Some(PathBuf::from(session_file));
        }
    }

    /// Check values that would only fail later at request time.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidValue(format!("api_url '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(format!(
                "api_url '{}' must use http or https",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
