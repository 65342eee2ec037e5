//! Integration test: configuration loading
//!
//! Covers config path resolution and YAML + environment loading. Tests that
//! touch process environment run serially.

use serial_test::serial;
use std::env;
use std::io::Write;
use taskboard_client::bin_common::{load_config_from_env, ConfigType};
use taskboard_client::taskboard::TaskboardConfig;

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

fn clear_overrides() {
    for var in ["TASKBOARD_API_URL", "TASKBOARD_WS_URL", "TASKBOARD_TOKEN"] {
        env::remove_var(var);
    }
}

const YAML: &str = r#"
api_url: "http://localhost:5000/api"
ws_url: "ws://localhost:5000"
token_path: "/tmp/taskboard-test-token"
log_level: "debug"
"#;

#[test]
#[serial]
fn test_taskboard_config_default_path() {
    env::remove_var("TASKBOARD_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::Taskboard);
    assert_eq!(config_path.to_str().unwrap(), "config/taskboard.yaml");
}

#[test]
#[serial]
fn test_config_path_from_env() {
    env::set_var("TASKBOARD_CONFIG_PATH", "/etc/taskboard.yaml");
    let config_path = load_config_from_env(ConfigType::Taskboard);
    env::remove_var("TASKBOARD_CONFIG_PATH");

    assert_eq!(config_path.to_str().unwrap(), "/etc/taskboard.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_overrides();
    let file = write_config(YAML);

    let config = TaskboardConfig::load(file.path()).unwrap();
    assert_eq!(config.api_url, "http://localhost:5000/api");
    assert_eq!(config.log_level, "debug");
    assert!(config.token.is_none());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_overrides();
    env::set_var("TASKBOARD_API_URL", "https://api.example.com");
    env::set_var("TASKBOARD_WS_URL", "wss://api.example.com/ws");
    env::set_var("TASKBOARD_TOKEN", "env-token");
    let file = write_config(YAML);

    let config = TaskboardConfig::load(file.path());
    clear_overrides();

    let config = config.unwrap();
    assert_eq!(config.api_url, "https://api.example.com");
    assert_eq!(config.ws_url, "wss://api.example.com/ws");
    assert_eq!(config.token.as_deref(), Some("env-token"));
    assert_eq!(config.token_store().token().as_deref(), Some("env-token"));
}

#[test]
#[serial]
fn test_invalid_env_override_fails_validation() {
    clear_overrides();
    env::set_var("TASKBOARD_WS_URL", "http://not-a-socket");
    let file = write_config(YAML);

    let result = TaskboardConfig::load(file.path());
    clear_overrides();

    assert!(result.is_err());
}

#[test]
fn test_missing_file_is_error() {
    assert!(TaskboardConfig::load("/definitely/not/here.yaml").is_err());
}
