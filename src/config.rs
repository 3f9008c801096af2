use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;

use crate::progress::cache::DEFAULT_REFRESH_INTERVAL;
use crate::progress::fetchers::github::DEFAULT_BASE_URL;
use crate::progress::types::ReleaseConfig;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default timeout for GitHub API requests in milliseconds (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Release {0:?} is configured more than once")]
    DuplicateRelease(String),

    #[error("No releases configured")]
    NoReleases,

    #[error("Refresh interval must be a positive number of milliseconds, got {0}")]
    InvalidRefreshInterval(i64),
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub releases: Vec<ReleaseConfig>,
    pub cache: CacheConfig,
    pub github: GitHubConfig,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Snapshot refresh interval in milliseconds
    pub refresh_interval: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL.num_milliseconds(),
        }
    }
}

impl CacheConfig {
    /// Returns the refresh interval, rejecting zero and negative values
    pub fn refresh_interval(&self) -> Result<TimeDelta, ConfigError> {
        if self.refresh_interval <= 0 {
            return Err(ConfigError::InvalidRefreshInterval(self.refresh_interval));
        }
        TimeDelta::try_milliseconds(self.refresh_interval)
            .ok_or(ConfigError::InvalidRefreshInterval(self.refresh_interval))
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub base_url: String,
    /// API token; `GITHUB_TOKEN` is used when unset
    pub token: Option<String>,
    /// Request timeout in milliseconds
    pub timeout: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Reads and validates the config file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.releases.is_empty() {
            return Err(ConfigError::NoReleases);
        }

        self.cache.refresh_interval()?;

        let mut seen = HashSet::new();
        for release in &self.releases {
            if !seen.insert(release.name.as_str()) {
                return Err(ConfigError::DuplicateRelease(release.name.clone()));
            }
        }

        Ok(())
    }
}

/// Returns the path to the data directory for release-progress.
/// Uses $XDG_DATA_HOME/release-progress if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-progress,
/// or ./release-progress if neither is available.
pub fn data_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the default config file.
/// Uses $XDG_CONFIG_HOME/release-progress/config.json, falling back to
/// ~/.config/release-progress/config.json.
pub fn config_path() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-progress.log")
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("release-progress")
}
