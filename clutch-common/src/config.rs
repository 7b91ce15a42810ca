//! Configuration loading
//!
//! Settings resolve highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::{Error, Result};

/// Service configuration, deserialized from clutch.toml with per-field
/// defaults so a missing or partial file still yields a runnable config
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClutchConfig {
    /// HTTP bind address
    pub bind_addr: String,
    /// SQLite database path; None means the platform default location
    pub database_path: Option<PathBuf>,
    /// Auto-pilot simulator settings
    pub autopilot: AutoPilotConfig,
    /// Seconds between reconciliation refetches of the mission store
    pub reconcile_interval_secs: u64,
}

/// Auto-pilot timing and default state
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoPilotConfig {
    /// Whether auto-pilot starts enabled
    pub enabled: bool,
    /// Lower bound of the randomized tick interval, seconds
    pub min_interval_secs: u64,
    /// Upper bound of the randomized tick interval, seconds
    pub max_interval_secs: u64,
    /// Restrict the eligible set to one project; None means fleet-wide
    pub project_id: Option<Uuid>,
}

impl Default for ClutchConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:4002".to_string(),
            database_path: None,
            autopilot: AutoPilotConfig::default(),
            reconcile_interval_secs: 5,
        }
    }
}

impl Default for AutoPilotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_secs: 6,
            max_interval_secs: 10,
            project_id: None,
        }
    }
}

impl AutoPilotConfig {
    /// Randomized tick interval bounds as durations
    pub fn interval_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.min_interval_secs),
            Duration::from_secs(self.max_interval_secs),
        )
    }
}

impl ClutchConfig {
    /// Load configuration from an explicit path, or from the default
    /// locations when none is given; absent file yields defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_file(),
        };

        let Some(file) = candidate.filter(|p| p.exists()) else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(&file)?;
        let config: ClutchConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", file.display(), e)))?;

        if config.autopilot.min_interval_secs > config.autopilot.max_interval_secs {
            return Err(Error::Config(
                "autopilot.min_interval_secs exceeds max_interval_secs".to_string(),
            ));
        }
        Ok(config)
    }

    /// Resolve the database path: config value, then CLUTCH_DB environment
    /// variable, then the platform data directory
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        if let Ok(path) = std::env::var("CLUTCH_DB") {
            return PathBuf::from(path);
        }
        default_data_dir().join("clutch.db")
    }
}

/// Default config file location (~/.config/clutch/clutch.toml)
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("clutch").join("clutch.toml"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clutch")
}
