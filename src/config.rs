use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::version::scheme::{SchemeRegistry, VersionScheme};

// =============================================================================
// Scheduling and storage constants
// =============================================================================

/// Default time between two checks of a project in seconds (1 hour)
pub const DEFAULT_CHECK_INTERVAL_SECS: i64 = 60 * 60;

/// Default number of projects checked concurrently
pub const DEFAULT_WORKERS: usize = 10;

/// Longest raw version string the history table accepts
pub const VERSION_MAX_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub scheduler: SchedulerConfig,
    pub versions: VersionsConfig,
    /// SQLite database path, defaults to [`db_path`]
    pub database: Option<PathBuf>,
}

impl MonitorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(db_path)
    }
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Size of the worker pool
    pub workers: usize,
    /// Seconds until a checked project is due again
    pub check_interval: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            check_interval: DEFAULT_CHECK_INTERVAL_SECS,
        }
    }
}

/// Version scheme defaults
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionsConfig {
    pub default_scheme: VersionScheme,
    /// Ecosystem name -> scheme
    pub ecosystems: HashMap<String, VersionScheme>,
    /// Backend name -> scheme, wins over the backend's own default
    pub backends: HashMap<String, VersionScheme>,
}

impl VersionsConfig {
    pub fn scheme_registry(&self) -> SchemeRegistry {
        let registry = SchemeRegistry::new(self.default_scheme);
        let registry = self
            .ecosystems
            .iter()
            .fold(registry, |registry, (name, scheme)| {
                registry.with_ecosystem(name, *scheme)
            });
        self.backends
            .iter()
            .fold(registry, |registry, (name, scheme)| {
                registry.with_backend(name, *scheme)
            })
    }
}

/// Returns the path to the data directory for release-watch.
/// Uses $XDG_DATA_HOME/release-watch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-watch,
/// or ./release-watch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("release-watch.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-watch.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-watch")
}
