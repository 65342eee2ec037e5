use crate::infrastructure::client::api::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::infrastructure::client::realtime::ChannelSettings;
use realtime::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const API_URL_ENV: &str = "TASKBOARD_API_URL";
pub const WS_URL_ENV: &str = "TASKBOARD_WS_URL";
pub const TOKEN_ENV: &str = "TASKBOARD_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskboardConfig {
    /// REST API base URL
    pub api_url: String,
    /// Realtime socket URL
    pub ws_url: String,
    /// File holding the session token
    #[serde(default = "default_token_path")]
    pub token_path: String,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Realtime reconnection; never by default
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    /// Board the watcher opens when none is given on the command line
    #[serde(default)]
    pub board_id: Option<String>,

    /// Session token from .env (not in YAML)
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_token_path() -> String {
    ".taskboard/token".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl TaskboardConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: TaskboardConfig = serde_yaml::from_str(&yaml_content)?;

        dotenv::dotenv().ok();
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML without consulting the environment
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TaskboardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            info!("Overriding API URL from environment variable");
            self.api_url = url;
        }
        if let Ok(url) = std::env::var(WS_URL_ENV) {
            info!("Overriding realtime URL from environment variable");
            self.ws_url = url;
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.token = Some(token.trim().to_string());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "api_url must start with http:// or https://".to_string(),
            ));
        }
        if self.ws_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "ws_url cannot be empty".to_string(),
            ));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(
                "ws_url must start with ws:// or wss://".to_string(),
            ));
        }
        if self.token_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "token_path cannot be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            url: self.ws_url.clone(),
            reconnect: self.reconnect.clone(),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Token from the environment when set, otherwise the token file
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match &self.token {
            Some(token) => Arc::new(MemoryTokenStore::with_token(token.clone())),
            None => Arc::new(FileTokenStore::new(&self.token_path)),
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  API URL: {}", self.api_url);
        info!("  Realtime URL: {}", self.ws_url);
        info!(
            "  Token source: {}",
            if self.token.is_some() { TOKEN_ENV } else { self.token_path.as_str() }
        );
        info!("  Request timeout: {} seconds", self.request_timeout_secs);
        info!("  Reconnect: {:?}", self.reconnect);
        info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
api_url: "http://localhost:5000/api"
ws_url: "ws://localhost:5000"
"#;

    #[test]
    fn test_defaults() {
        let config = TaskboardConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.token_path, ".taskboard/token");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.reconnect, ReconnectPolicy::Never);
        assert!(config.token.is_none());
        assert!(config.channel_settings().connect_timeout.is_none());
    }

    #[test]
    fn test_reconnect_block() {
        let yaml = format!(
            "{}reconnect:\n  kind: exponential\n  initial_delay_ms: 100\n  max_delay_ms: 1000\n  max_attempts: 3\n",
            YAML
        );
        let config = TaskboardConfig::from_yaml(&yaml).unwrap();
        assert!(matches!(config.reconnect, ReconnectPolicy::Exponential { .. }));
    }

    #[test]
    fn test_config_validation() {
        let mut config = TaskboardConfig::from_yaml(YAML).unwrap();
        assert!(config.validate().is_ok());

        config.ws_url = "http://localhost:5000".into();
        assert!(config.validate().is_err());
        config.ws_url = "wss://example.com".into();

        config.api_url = String::new();
        assert!(config.validate().is_err());
        config.api_url = "https://example.com".into();

        config.log_level = "loud".into();
        assert!(config.validate().is_err());
        config.log_level = "DEBUG".into();
        assert!(config.validate().is_ok());

        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_store_prefers_env_token() {
        let mut config = TaskboardConfig::from_yaml(YAML).unwrap();
        config.token = Some("from-env".into());
        assert_eq!(config.token_store().token().as_deref(), Some("from-env"));
    }
}
