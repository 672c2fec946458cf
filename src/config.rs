//! Configuration file support.
//!
//! Settings for the `skyregions` tool: logging verbosity and the defaults
//! used when writing region files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::{DEFAULT_PRECISION, ExportOptions};

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    #[default]
    Warn,
    /// Show errors, warnings, and info messages
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

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

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Decimal places for written coordinates and parameters
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Replace existing output files
    #[serde(default)]
    pub overwrite: bool,

    /// Format used when an output path cannot be identified
    #[serde(default)]
    pub default_format: Option<String>,
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

impl RegionsConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            precision: default_precision(),
            overwrite: false,
            default_format: None,
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Options for writing regions with these settings.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new()
            .precision(self.precision)
            .overwrite(self.overwrite)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "skyregions.json"
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("skyregions").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("skyregions")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = RegionsConfig::new();
        config.log_level = LogLevel::Debug;
        config.precision = 4;
        config.default_format = Some("ds9".to_string());

        let json = config.to_json().unwrap();
        let loaded = RegionsConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = RegionsConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(config, RegionsConfig::default());
        assert_eq!(config.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            RegionsConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_export_options() {
        let mut config = RegionsConfig::new();
        config.precision = 3;
        config.overwrite = true;

        let options = config.export_options();
        assert_eq!(options.precision, 3);
        assert!(options.overwrite);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyregions.json");
        std::fs::write(&path, r#"{ "version": 1, "log_level": "trace", "overwrite": true }"#)
            .unwrap();

        let config = RegionsConfig::load(&path).unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Trace);
        assert!(config.overwrite);

        assert!(matches!(
            RegionsConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::IoError(_))
        ));
    }
}
