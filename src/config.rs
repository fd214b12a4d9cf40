//! Runtime configuration: where the slots live and how chatty the logger is.
//!
//! Each value is taken from the first source that provides it: command-line flag,
//! environment variable, then the platform default.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

pub const APP_DIR_NAME: &str = "raspored-plus";
pub const DATA_DIR_ENV: &str = "RASPORED_DATA_DIR";
pub const LOG_ENV: &str = "RASPORED_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine a data directory; pass --data-dir or set RASPORED_DATA_DIR")]
    NoDataDir,

    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_spec: String,
}

impl Config {
    pub fn resolve(data_dir_flag: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_from(
            data_dir_flag,
            |key| std::env::var(key).ok(),
            dirs::data_dir(),
        )
    }

    pub fn resolve_from(
        data_dir_flag: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
        platform_data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let data_dir = data_dir_flag
            .or_else(|| non_blank(DATA_DIR_ENV).map(PathBuf::from))
            .or_else(|| platform_data_dir.map(|dir| dir.join(APP_DIR_NAME)))
            .ok_or(ConfigError::NoDataDir)?;

        let log_spec = non_blank(LOG_ENV)
            .or_else(|| non_blank("RUST_LOG"))
            .unwrap_or_else(|| default_log_spec().to_string());

        Ok(Self { data_dir, log_spec })
    }

    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::CreateDir {
            path: self.data_dir.display().to_string(),
            source,
        })
    }
}

pub fn default_log_spec() -> &'static str {
    // Dependencies stay at WARN; the crate is more verbose in debug builds.
    if cfg!(debug_assertions) {
        "warn,raspored_lib=debug,raspored=debug"
    } else {
        "warn,raspored_lib=info,raspored=info"
    }
}
