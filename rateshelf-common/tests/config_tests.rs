//! Tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate RATESHELF_* environment variables are marked
//! #[serial] so they never run in parallel with each other.

use rateshelf_common::config::{
    load_config_or_default, load_toml_config, resolve_setting, ClientConfig,
    ServerConfig, TomlConfig, DEFAULT_API_URL, DEFAULT_LISTEN_ADDR, ENV_API_URL,
    ENV_DATABASE_URL, ENV_LISTEN_ADDR,
};
use serial_test::serial;
use std::env;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_DATABASE_URL);
    env::remove_var(ENV_LISTEN_ADDR);
    env::remove_var(ENV_API_URL);
}

#[test]
#[serial]
fn test_cli_beats_env_beats_toml() {
    clear_env();
    env::set_var(ENV_LISTEN_ADDR, "0.0.0.0:9000");

    let toml = TomlConfig {
        listen_addr: Some("127.0.0.1:7000".to_string()),
        ..Default::default()
    };

    let from_cli = ServerConfig::resolve(None, Some("127.0.0.1:8000"), &toml);
    assert_eq!(from_cli.listen_addr, "127.0.0.1:8000");

    let from_env = ServerConfig::resolve(None, None, &toml);
    assert_eq!(from_env.listen_addr, "0.0.0.0:9000");

    env::remove_var(ENV_LISTEN_ADDR);
    let from_toml = ServerConfig::resolve(None, None, &toml);
    assert_eq!(from_toml.listen_addr, "127.0.0.1:7000");

    let from_default = ServerConfig::resolve(None, None, &TomlConfig::default());
    assert_eq!(from_default.listen_addr, DEFAULT_LISTEN_ADDR);
    assert!(from_default.database_url.starts_with("sqlite://"));
}

#[test]
#[serial]
fn test_blank_values_fall_through() {
    clear_env();
    env::set_var(ENV_DATABASE_URL, "   ");
    let value = resolve_setting(Some(""), ENV_DATABASE_URL, Some("sqlite::memory:"), || {
        "fallback".to_string()
    });
    assert_eq!(value, "sqlite::memory:");
    clear_env();
}

#[test]
#[serial]
fn test_client_url_trailing_slash_trimmed() {
    clear_env();
    let config = ClientConfig::resolve(Some("http://example.test:1234/"), &TomlConfig::default());
    assert_eq!(config.api_url, "http://example.test:1234");

    let config = ClientConfig::resolve(None, &TomlConfig::default());
    assert_eq!(config.api_url, DEFAULT_API_URL);
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = TomlConfig {
        database_url: Some("sqlite:///tmp/shelf.db".to_string()),
        listen_addr: None,
        api_url: Some("http://localhost:5730".to_string()),
        logging: Default::default(),
    };
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.logging.level, "info");
}

#[test]
fn test_broken_toml_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "database_url = [unterminated").unwrap();

    assert!(load_toml_config(&path).is_err());
    assert_eq!(load_config_or_default(Some(&path)), TomlConfig::default());
}

#[test]
fn test_missing_toml_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");
    assert_eq!(load_config_or_default(Some(&path)), TomlConfig::default());
}
