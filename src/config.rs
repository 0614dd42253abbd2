//! Configuration management for songpick.
//!
//! Settings come from three places, highest priority first:
//! 1. Environment variables (`SERVER_ADDRESS`, `SONGPICK_CONFIG`)
//! 2. A `.env` file and a `config.toml` in the local data directory
//! 3. Built-in defaults for every key
//!
//! The key names follow the chat-plugin configuration this bot replaces, so an
//! existing `api_config` block can be pasted in unchanged.

use std::{env, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::{
    error::ConfigError,
    types::{SelectionMode, Source},
};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8787";

/// Catalog endpoint settings (`[api_config]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the catalog, or the literal `custom` to use `custom_api_url`.
    pub api_url: String,
    pub custom_api_url: String,
    /// `1` appends `/api` to the base URL, anything else uses it as given.
    pub api_type: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            custom_api_url: String::new(),
            api_type: 1,
        }
    }
}

/// How the catalog request URL is built from the configured base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    WithPath,
    Direct,
}

impl ApiConfig {
    pub fn endpoint_mode(&self) -> EndpointMode {
        if self.api_type == 1 {
            EndpointMode::WithPath
        } else {
            EndpointMode::Direct
        }
    }

    /// Resolves the final request URL, or `None` when nothing usable is configured.
    pub fn endpoint(&self) -> Option<String> {
        let base = if self.api_url.trim() == "custom" {
            self.custom_api_url.trim()
        } else {
            self.api_url.trim()
        };
        if base.is_empty() {
            return None;
        }

        Some(match self.endpoint_mode() {
            EndpointMode::WithPath => format!("{}/api", base.trim_end_matches('/')),
            EndpointMode::Direct => base.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_config: ApiConfig,
    pub default_source: Source,
    pub selection_mode: SelectionMode,
    pub search_result_count: usize,
    /// Download size cap in MiB.
    pub max_file_size: u64,
    pub auto_parse_url: bool,
    pub search_command: String,
    pub strict_url_check: bool,
    pub session_expiry_secs: u64,
    pub janitor_interval_secs: u64,
    pub cleanup_delay_secs: u64,
    pub download_timeout_secs: u64,
    pub api_timeout_secs: u64,
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_config: ApiConfig::default(),
            default_source: Source::Netease,
            selection_mode: SelectionMode::Manual,
            search_result_count: 10,
            max_file_size: 50,
            auto_parse_url: true,
            search_command: "点歌".to_string(),
            strict_url_check: true,
            session_expiry_secs: 60,
            janitor_interval_secs: 60,
            cleanup_delay_secs: 15,
            download_timeout_secs: 300,
            api_timeout_secs: 10,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Reads `config.toml` from [`config_path`]. A missing file yields the defaults.
    pub async fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        match async_fs::read_to_string(&path).await {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search_result_count == 0 {
            return Err(ConfigError::Invalid {
                key: "search_result_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid {
                key: "max_file_size",
                reason: "must be at least 1 MiB".to_string(),
            });
        }
        if self.search_command.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "search_command",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size.saturating_mul(1024 * 1024)
    }

    pub fn session_expiry(&self) -> Duration {
        Duration::from_secs(self.session_expiry_secs)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs.max(1))
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }
}

/// Directory holding `.env` and `config.toml`.
///
/// - Linux: `~/.local/share/songpick`
/// - macOS: `~/Library/Application Support/songpick`
/// - Windows: `%LOCALAPPDATA%/songpick`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songpick");
    path
}

/// Loads environment variables from `.env` in the data directory.
///
/// Creates the directory when it does not exist yet. A missing `.env` file is
/// not an error; a malformed one is.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Location of `config.toml`, overridable with `SONGPICK_CONFIG`.
pub fn config_path() -> PathBuf {
    match env::var("SONGPICK_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir().join("config.toml"),
    }
}

/// Address the HTTP surface binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}
