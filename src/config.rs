//! Configuration file support.
//!
//! Settings live in a JSON file under the platform config directory. Every
//! field is defaulted, so a missing or partial file always yields a usable
//! configuration.

use serde::{Deserialize, Serialize};

use crate::viewer::ViewerOptions;

/// Environment variable that overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "ZOOMAGE_BACKEND_URL";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the annotation backend. When unset the app runs
    /// against the built-in in-memory collaborator.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Viewer tuning passed to the viewer factory on every bind.
    #[serde(default)]
    pub viewer: ViewerOptions,
}

impl AppConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Default config file path, `<config_dir>/zoomage/config.json`.
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("zoomage").join("config.json"))
        } else if let Some(home_dir) = dirs::home_dir() {
            Some(home_dir.join(".config").join("zoomage").join("config.json"))
        } else {
            None
        }
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from_default_path().unwrap_or_default();
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                log::info!("backend URL overridden via {BACKEND_URL_ENV}");
                config.backend_url = Some(url);
            }
        }
        config
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

}
