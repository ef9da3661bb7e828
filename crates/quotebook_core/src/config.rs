//! Quote book configuration.
//!
//! # Responsibility
//! - Load `config.toml` and fill every missing value with a default.
//! - Resolve platform directories for the database and log files.
//!
//! # Invariants
//! - A missing config file is not an error.
//! - `sync.interval_secs` and `sync.timeout_secs` are never zero.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "quotebook";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "quotebook.sqlite3";
/// Public mock REST endpoint used when none is configured.
///
/// It serves `{userId, id, title, body}` posts, none of which carry a `text`
/// field, so the codec drops every entry and a sync merges nothing. Point
/// `sync.endpoint` at a service returning `[{"text": ..., "category": ...}]`
/// to get real data.
pub const DEFAULT_SYNC_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;
const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 10;

/// Configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotebookConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; defaults to the platform data directory.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; defaults to the platform local data directory.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub endpoint: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    /// POST the merged set back after each cycle.
    pub publish: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SYNC_ENDPOINT.to_string(),
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            timeout_secs: DEFAULT_SYNC_TIMEOUT_SECS,
            publish: false,
        }
    }
}

impl QuotebookConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("sync.endpoint cannot be empty".into()));
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_secs must be greater than zero".into(),
            ));
        }
        if self.sync.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Database path, falling back to `<data_dir>/quotebook/quotebook.sqlite3`.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.storage.db_path.clone().unwrap_or_else(|| {
            platform_dir(dirs::data_dir())
                .join(APP_DIR_NAME)
                .join(DB_FILE_NAME)
        })
    }

    /// Log directory, falling back to `<data_local_dir>/quotebook/logs`.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.logging.dir.clone().unwrap_or_else(|| {
            platform_dir(dirs::data_local_dir())
                .join(APP_DIR_NAME)
                .join("logs")
        })
    }
}

/// `<config_dir>/quotebook/config.toml`.
pub fn default_config_path() -> PathBuf {
    platform_dir(dirs::config_dir())
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

// Without a platform directory, fall back to an absolute temp location so
// logging (which requires absolute paths) still works.
fn platform_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(std::env::temp_dir)
}
