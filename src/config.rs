//! TOML configuration.
//!
//! ```toml
//! bind = "127.0.0.1:3000"
//! data_file = "books.json"
//! preferences_file = "preferences.json"
//! seed = true
//! prune_year = 2025
//!
//! [retry]
//! max_attempts = 5
//! initial_delay_ms = 200
//! max_delay_ms = 5000
//! factor = 2.0
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::RetryPolicy;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            factor: policy.factor,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            factor: self.factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookshelfConfig {
    /// HTTP listen address.
    pub bind: String,
    /// JSON file backing the record store; in-memory when absent.
    pub data_file: Option<PathBuf>,
    pub preferences_file: PathBuf,
    /// Load the sample books into an empty store on startup.
    pub seed: bool,
    /// Drop records outside this year on startup.
    pub prune_year: Option<i32>,
    pub retry: RetryConfig,
}

impl Default for BookshelfConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            data_file: None,
            preferences_file: PathBuf::from("preferences.json"),
            seed: false,
            prune_year: None,
            retry: RetryConfig::default(),
        }
    }
}

impl BookshelfConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
