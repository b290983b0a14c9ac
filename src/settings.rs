//! Persisted local settings.
//!
//! One JSON document at one path holds the profile fields, theme choice,
//! and notification/2FA toggles. It is read once at startup and written
//! back on every change; no other module touches the file directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Visual theme applied to rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => Err(format!(
                "unknown theme '{}' (expected: light, dark, auto)",
                other
            )),
        }
    }
}

/// The settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(rename = "emailNotifications", default = "default_true")]
    pub email_notifications: bool,
    #[serde(rename = "twoFactorAuth", default)]
    pub two_factor_auth: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: default_name(),
            email: default_email(),
            theme: Theme::default(),
            email_notifications: true,
            two_factor_auth: false,
        }
    }
}

fn default_name() -> String {
    "John Doe".to_string()
}

fn default_email() -> String {
    "john.doe@example.com".to_string()
}

fn default_true() -> bool {
    true
}

/// Process-wide settings store bound to a single file.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file yields defaults; a file
    /// that exists but cannot be parsed is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            Settings::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            settings,
        })
    }

    /// Current settings.
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Effective theme for rendering.
    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    /// Apply a mutation and persist immediately.
    pub fn update(&mut self, mutate: impl FnOnce(&mut Settings)) -> Result<()> {
        mutate(&mut self.settings);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.settings)
            .context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
