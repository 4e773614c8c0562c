//! Configuration file handling for stream-overlay.
//!
//! Loads configuration from `<config dir>/stream-overlay/config.toml` or a
//! custom path. Values resolve as: CLI flag > environment > file > defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::{API_URL_ENV, DEFAULT_API_BASE_URL};
use crate::player::DEFAULT_PLAYER_PROGRAM;

/// Commented default written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# stream-overlay configuration

[api]
# Base URL of the overlay/stream backend
base_url = "http://localhost:5001/api"
# Request timeout in seconds
timeout_secs = 30
# Connection timeout in seconds
connect_timeout_secs = 10

[player]
# HLS player executable used by the console preview
program = "ffplay"
# Initial volume (0.0-1.0)
volume = 1.0
# Disable buffering for lower latency
low_latency = true
"#;

/// Configuration file structure for stream-overlay.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_true")]
    pub low_latency: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            volume: default_volume(),
            low_latency: true,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_program() -> String {
    DEFAULT_PLAYER_PROGRAM.to_string()
}

fn default_volume() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply the API URL from the environment, then from the CLI flag.
    pub fn with_overrides(mut self, api_url: Option<&str>) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        self
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("stream-overlay").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/stream-overlay/config.toml")
        })
}
