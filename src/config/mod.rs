//! # Configuration Management Module
//!
//! Runtime settings for the node tool, stored as TOML.
//!
//! ## Configuration Structure
//!
//! - [`SerialConfig`] - Default device to send frames to
//! - [`PresetConfig`] - Where traction PID presets are persisted
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! Line parameters (9600 baud, 8-N-1, 1 s timeout) are fixed by the node
//! firmware and are not configurable here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mrex_nodetool::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Presets: {}", config.presets.path);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//!
//! [presets]
//! path = "pid_presets.json"
//!
//! [logging]
//! level = "info"
//! file = "nodetool.log"
//! ```
//!
//! Precedence: CLI args > Config file > Defaults

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::presets::DEFAULT_PRESET_PATH;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub presets: PresetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device used when `--port` is not given. Empty means no port selected.
    #[serde(default)]
    pub port: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default = "default_preset_path")]
    pub path: String,
}

fn default_preset_path() -> String {
    DEFAULT_PRESET_PATH.to_string()
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            path: default_preset_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Port to use: the CLI value wins, then the configured one.
    pub fn resolve_port(&self, cli_port: Option<&str>) -> String {
        cli_port.map(str::to_string).unwrap_or_else(|| self.serial.port.clone())
    }
}
