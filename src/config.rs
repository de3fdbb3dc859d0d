use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-desk";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_FILE_NAME: &str = "library-desk.log";

/// Settings read from `~/.library-desk/config.toml`. Every key is optional;
/// a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_path: PathBuf,
    /// Hold borrow/return transactions open until the operator confirms.
    pub pause_on_lock: bool,
    pub busy_timeout_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: data_dir().join(DB_FILE_NAME),
            pause_on_lock: true,
            busy_timeout_ms: 5_000,
            log_file: None,
        }
    }
}

impl Config {
    /// Load from `explicit` when given (it must exist), otherwise from the
    /// default location if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("failed to parse TOML")?;
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Where the TUI writes its log; defaults to the data directory.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join(LOG_FILE_NAME))
    }
}

/// `~/.library-desk`, or a relative `.library-desk` when no home directory
/// can be found.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

pub fn default_config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE_NAME)
}
