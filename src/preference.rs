//! Light/dark display preference, persisted as a single key-value pair.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum PreferenceError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::Io(e) => write!(f, "preference io error: {}", e),
            PreferenceError::Serde(e) => write!(f, "preference file is malformed: {}", e),
        }
    }
}

impl std::error::Error for PreferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreferenceError::Io(e) => Some(e),
            PreferenceError::Serde(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PreferenceError {
    fn from(err: std::io::Error) -> Self {
        PreferenceError::Io(err)
    }
}

impl From<serde_json::Error> for PreferenceError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceError::Serde(err)
    }
}

/// Small JSON key-value file holding the display preference.
#[derive(Debug, Clone)]
pub struct PreferenceFile {
    path: PathBuf,
}

impl PreferenceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// The stored theme; light when nothing (or something unrecognised) is stored.
    pub fn theme(&self) -> Result<Theme, PreferenceError> {
        let values = self.read_all()?;
        Ok(values
            .get(THEME_KEY)
            .and_then(|value| Theme::parse(value))
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(THEME_KEY.to_string(), theme.as_str().to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&values)?)?;
        Ok(())
    }

    /// Flip light/dark, store it, and return the new value.
    pub fn toggle_theme(&self) -> Result<Theme, PreferenceError> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        tracing::debug!(theme = next.as_str(), "theme toggled");
        Ok(next)
    }
}
