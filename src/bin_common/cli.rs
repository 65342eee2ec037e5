//! CLI utilities for binaries
//!
//! Resolves configuration paths from environment variables.

use std::path::PathBuf;

/// Which configuration file to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Client configuration (config/taskboard.yaml)
    Taskboard,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Taskboard => "config/taskboard.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    pub fn env_var_name(&self) -> &str {
        "TASKBOARD_CONFIG_PATH"
    }
}

/// Configuration path from the environment, or the default for `config_type`
///
/// A custom path always wins over the environment.
///
/// # Examples
/// ```
/// use taskboard_client::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("my.yaml".into()));
/// assert_eq!(path.to_str(), Some("my.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Command line arguments, excluding the program name
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
