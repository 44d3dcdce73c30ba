//! Configuration management for kql-lens.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the table catalog, summarization thresholds and the query lookback.

use crate::backend::DEFAULT_TIMESPAN_DAYS;
use crate::catalog::{TableCatalog, TableEntry};
use crate::error::{LensError, Result};
use crate::result::NormalizerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `normalizer.sample_limit`.
pub const ENV_SAMPLE_LIMIT: &str = "KQL_LENS_SAMPLE_LIMIT";

/// Environment variable overriding `normalizer.sample_size`.
pub const ENV_SAMPLE_SIZE: &str = "KQL_LENS_SAMPLE_SIZE";

/// Environment variable overriding `backend.timespan_days`.
pub const ENV_TIMESPAN_DAYS: &str = "KQL_LENS_TIMESPAN_DAYS";

/// Main configuration structure for kql-lens.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Summarization thresholds.
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Query execution settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Table catalog. Empty means the Application Insights defaults.
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

/// Query execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Lookback window for every query, in days.
    #[serde(default = "default_timespan_days")]
    pub timespan_days: u64,
}

fn default_timespan_days() -> u64 {
    DEFAULT_TIMESPAN_DAYS
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            timespan_days: default_timespan_days(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kql-lens")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| LensError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            LensError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Builds the table catalog described by this configuration.
    pub fn catalog(&self) -> Result<TableCatalog> {
        if self.tables.is_empty() {
            return Ok(TableCatalog::application_insights());
        }
        TableCatalog::new(self.tables.clone())
    }

    /// Checks thresholds, lookback and catalog.
    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        if self.backend.timespan_days == 0 {
            return Err(LensError::config("timespan_days must be at least 1"));
        }
        self.catalog().map(|_| ())
    }

    /// Applies `KQL_LENS_*` environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(limit) = parse_override(&lookup, ENV_SAMPLE_LIMIT)? {
            self.normalizer.sample_limit = limit;
        }
        if let Some(size) = parse_override(&lookup, ENV_SAMPLE_SIZE)? {
            self.normalizer.sample_size = size;
        }
        if let Some(days) = parse_override(&lookup, ENV_TIMESPAN_DAYS)? {
            self.backend.timespan_days = days;
        }
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LensError::config(format!("{key} must be a positive integer, got '{raw}'"))),
        None => Ok(None),
    }
}
