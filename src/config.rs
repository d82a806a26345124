//! Runtime configuration read from the environment (and `.env`).

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;

use crate::charts::Locale;

/// Default rolling window for charts, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the reading store and the session file.
    pub data_dir: PathBuf,
    pub locale: Locale,
    pub window_days: u32,
    pub log_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            locale: Locale::default(),
            window_days: DEFAULT_WINDOW_DAYS,
            log_file_path: PathBuf::from("logs/meter_readings.log"),
        }
    }
}

impl Config {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup("METER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(locale) = lookup("METER_LOCALE") {
            config.locale = locale
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("invalid METER_LOCALE")?;
        }

        if let Some(days) = lookup("METER_WINDOW_DAYS") {
            config.window_days = days
                .trim()
                .parse()
                .with_context(|| format!("invalid METER_WINDOW_DAYS '{days}'"))?;
        }

        if let Some(path) = lookup("LOG_FILE_PATH") {
            config.log_file_path = PathBuf::from(path);
        }

        Ok(config)
    }
}
