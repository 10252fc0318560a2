//! Configuration module for Treecast
//!
//! This module handles user preferences for the export CLI (the default
//! embedded font and the last-used export format and directory), including
//! serialization to/from JSON and persistent storage in the
//! platform-specific configuration directory.
//!
//! Loading is forgiving: a missing or corrupted settings file falls back to
//! defaults with a logged warning, never an abort.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};
use crate::export::font::FontRequest;
use crate::export::options::ExportSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "treecast";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "settings.json";

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Export defaults (format, directory)
    pub export: ExportSettings,

    /// Font embedded into vector exports when the snapshot names none
    pub font: Option<FontRequest>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export: ExportSettings::default(),
            font: Some(FontRequest::new("Inter", "assets/fonts/Inter-Regular.woff2")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from the default config file location.
///
/// If the file doesn't exist or is corrupted, this falls back to defaults
/// with a logged warning.
pub fn load_settings() -> Settings {
    load_settings_internal().unwrap_or_warn_default(Settings::default(), "Failed to load settings")
}

fn load_settings_internal() -> Result<Settings> {
    let config_path = get_config_file_path()?;
    load_settings_from(&config_path)
}

/// Load settings from an explicit path (missing file yields defaults).
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(
            "Settings file not found at {}, using defaults",
            path.display()
        );
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    serde_json::from_str(&contents).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save settings to the default config file location, creating the
/// directory when needed.
pub fn save_settings(settings: &Settings) -> Result<()> {
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.clone(),
            source: Box::new(e),
        })?;
    }
    save_settings_to(settings, &config_dir.join(CONFIG_FILE_NAME))
}

/// Save settings to an explicit path.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    fs::write(path, json).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Save settings, logging instead of failing. Returns whether the save
/// succeeded.
pub fn save_settings_silent(settings: &Settings) -> bool {
    match save_settings(settings) {
        Ok(()) => true,
        Err(err) => {
            warn!("Could not persist settings: {}", err);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
