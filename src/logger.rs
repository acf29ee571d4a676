//! File logging setup.
//!
//! Diagnostics go through the `log` facade and are written by `fern` to a file,
//! never to the terminal the UI is drawing on.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::LoggingConfig;
use crate::constants::{APP_DIR_NAME, LOG_FILE_NAME};

/// Path of the log file, under the user's data directory when available
pub fn log_file_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILE_NAME)
}

/// Install the global logger. Does nothing when logging is disabled.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let path = log_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.level_filter()?)
        .chain(fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?)
        .apply()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(Some(path))
}
