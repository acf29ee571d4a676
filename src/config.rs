//! Configuration management for swarmdeck
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, LOG_LINES_MAX, LOG_LINES_MIN, PAGE_SIZE_MAX, PAGE_SIZE_MIN,
};
use crate::ui::components::SortMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub logs: LogsConfig,
    pub logging: LoggingConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial sort column of the service list
    /// Options: "name", "image", "replicas"
    pub default_sort: SortMode,
    /// Rows moved by PageUp/PageDown
    pub page_size: usize,
}

/// Service logs configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// `since` filter used when the logs prompt is confirmed empty ("" = all logs)
    pub default_since: String,
    /// Maximum number of lines kept by the log viewer
    pub max_lines: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable file logging
    pub enabled: bool,
    /// One of "error", "warn", "info", "debug", "trace"
    pub level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::Name,
            page_size: 10,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            default_since: String::new(),
            max_lines: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The configured level as a `log` filter
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.level).map_err(|_| anyhow::anyhow!("Invalid logging level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file();

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_DIR_NAME).join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ui.page_size < PAGE_SIZE_MIN || self.ui.page_size > PAGE_SIZE_MAX {
            anyhow::bail!(
                "page_size must be between {} and {}, got {}",
                PAGE_SIZE_MIN,
                PAGE_SIZE_MAX,
                self.ui.page_size
            );
        }

        if self.logs.max_lines < LOG_LINES_MIN || self.logs.max_lines > LOG_LINES_MAX {
            anyhow::bail!(
                "max_lines must be between {} and {}, got {}",
                LOG_LINES_MIN,
                LOG_LINES_MAX,
                self.logs.max_lines
            );
        }

        self.logging.level_filter()?;
        Ok(())
    }
}
