//! Configuration loading and setting resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops a process from starting;
//! it is logged and the remaining tiers apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_FILE: &str = "RATESHELF_CONFIG";
/// Environment variable for the store connection string
pub const ENV_DATABASE_URL: &str = "RATESHELF_DATABASE_URL";
/// Environment variable for the server listen address
pub const ENV_LISTEN_ADDR: &str = "RATESHELF_LISTEN_ADDR";
/// Environment variable for the API base URL used by the client
pub const ENV_API_URL: &str = "RATESHELF_API_URL";

/// Default server listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5730";
/// Default API base URL for the client
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5730";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_url: Option<String>,
    pub listen_addr: Option<String>,
    pub api_url: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub listen_addr: String,
}

impl ServerConfig {
    /// Resolve server settings from CLI overrides, environment and TOML
    pub fn resolve(
        cli_database_url: Option<&str>,
        cli_listen_addr: Option<&str>,
        toml: &TomlConfig,
    ) -> Self {
        Self {
            database_url: resolve_setting(
                cli_database_url,
                ENV_DATABASE_URL,
                toml.database_url.as_deref(),
                default_database_url,
            ),
            listen_addr: resolve_setting(
                cli_listen_addr,
                ENV_LISTEN_ADDR,
                toml.listen_addr.as_deref(),
                || DEFAULT_LISTEN_ADDR.to_string(),
            ),
        }
    }
}

/// Resolved client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    pub fn resolve(cli_api_url: Option<&str>, toml: &TomlConfig) -> Self {
        let api_url = resolve_setting(cli_api_url, ENV_API_URL, toml.api_url.as_deref(), || {
            DEFAULT_API_URL.to_string()
        });
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Resolve one setting through the four tiers
///
/// Blank values at any tier are skipped.
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
    default: impl FnOnce() -> String,
) -> String {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg.filter(|v| !v.trim().is_empty()) {
        return value.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.trim().is_empty() {
            return value;
        }
    }

    // Priority 3: TOML config file
    if let Some(value) = toml_value.filter(|v| !v.trim().is_empty()) {
        return value.to_string();
    }

    // Priority 4: Compiled default
    default()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the config file: explicit path, then `RATESHELF_CONFIG`, then the
/// per-user default if it exists
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir()
        .map(|d| d.join("rateshelf").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load the TOML config, degrading to defaults on any problem
pub fn load_config_or_default(explicit: Option<&Path>) -> TomlConfig {
    let Some(path) = config_file_path(explicit) else {
        debug!("No config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    }
}

/// Default store location: `<data dir>/rateshelf/rateshelf.db`
pub fn default_database_url() -> String {
    let data_dir = dirs::data_local_dir()
        .map(|d| d.join("rateshelf"))
        .unwrap_or_else(|| PathBuf::from("./rateshelf_data"));
    format!("sqlite://{}?mode=rwc", data_dir.join("rateshelf.db").display())
}
