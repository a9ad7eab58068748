//! Configuration lookup: process environment first, then
//! `$HOME/.standup-digest/settings.json`.
//!
//! The settings file holds a single `env` object whose entries stand in for
//! environment variables that are not set:
//!
//! ```json
//! { "env": { "GEMINI_API_KEY": "...", "STANDUP_DIGEST_RETRY_BASE_MS": "500" } }
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Settings loaded from `$HOME/.standup-digest/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Fallback values for environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads the settings file from its default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::default_path()?)
    }

    /// Loads the default settings file, or empty settings if it cannot be
    /// read. The failure is logged; the environment still applies.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable settings file");
            Self::default()
        })
    }

    /// Loads settings from `path`. A missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No settings file");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// `$HOME/.standup-digest/settings.json`
    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir.join(".standup-digest").join("settings.json"))
    }

    /// Value of `key` from the environment, else from the settings file.
    ///
    /// Blank values count as unset in both places.
    pub fn lookup(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.env
                    .get(key)
                    .filter(|v| !v.trim().is_empty())
                    .cloned()
            })
    }
}
