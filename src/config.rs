// Persistent application settings

use crate::kountdown::SortKind;
use crate::transfer::{DEFAULT_EXPORT_NAME, write_atomic};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "daykountdown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Last sort order chosen by the user
    #[serde(default)]
    pub sort: SortKind,
    /// File name suggested for exports
    #[serde(default = "default_export_name")]
    pub export_name: String,
}

fn default_database() -> PathBuf {
    Config::data_dir().join(format!("{}.db", APP_DIR))
}

fn default_export_name() -> String {
    DEFAULT_EXPORT_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            sort: SortKind::default(),
            export_name: default_export_name(),
        }
    }
}

impl Config {
    /// Per-user config directory for the app
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Per-user data directory, home of the database
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Default config file location
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(format!("{}.yaml", APP_DIR))
    }

    /// Load settings from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        let config = serde_yaml::from_str(&content).context("Failed to parse configuration file")?;
        Ok(config)
    }

    /// Write settings to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let yaml = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        write_atomic(path, yaml.as_bytes())?;
        debug!(path = ?path, "Saved config");
        Ok(())
    }
}
