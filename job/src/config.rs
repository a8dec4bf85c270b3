//! Configuration management (TOML)

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub baseline: BaselineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub window_hours: u64,
    pub band_multiplier: f64,
    pub order: OrderPolicy,
}

/// Order in which the merged set is walked by the baseline pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Stored records first, then new snapshot records, as merged.
    #[default]
    Arrival,
    /// Stable sort by timestamp before the pass.
    Chronological,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: Config::data_dir().join("analytics.db"),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            endpoint: "http://127.0.0.1:5000/generate-data".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        BaselineConfig {
            window_hours: 24,
            band_multiplier: 1.5,
            order: OrderPolicy::Arrival,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.baseline.window_hours == 0 {
            bail!("baseline.window_hours must be greater than zero");
        }
        if !self.baseline.band_multiplier.is_finite() || self.baseline.band_multiplier < 0.0 {
            bail!("baseline.band_multiplier must be a finite, non-negative number");
        }
        if self.feed.endpoint.trim().is_empty() {
            bail!("feed.endpoint must not be empty");
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "exectime-job")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "exectime-job")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
