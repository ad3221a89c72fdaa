//! Codec configuration
//!
//! Defines the `xcproj.json` settings file. Every field has a default, so an
//! empty `{}` file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the per-project settings file
pub const CONFIG_FILE_NAME: &str = "xcproj.json";

/// Options that shape encoded output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecConfig {
    /// Write `baseConfigurationReference` on build configurations.
    /// Disable to reproduce output that leaves it out.
    #[serde(default = "default_true")]
    pub emit_base_configuration_reference: bool,

    /// Wrap each object kind in `/* Begin X section */` markers
    #[serde(default = "default_true")]
    pub section_comments: bool,

    /// Project name used in comments on project-level records, normally
    /// the `.xcodeproj` bundle name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            emit_base_configuration_reference: true,
            section_comments: true,
            project_name: None,
        }
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config file not found at {0}")]
    NotFound(String),
}

impl CodecConfig {
    /// Parse a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Find the config that applies to `dir`.
    ///
    /// Checks `dir/xcproj.json`, then the user config directory, and falls
    /// back to defaults when neither exists.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = std::iter::once(dir.join(CONFIG_FILE_NAME)).chain(user_config_path());
        for candidate in candidates {
            if candidate.exists() {
                tracing::debug!("Using config {}", candidate.display());
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// `<config dir>/xcproj/config.json`, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xcproj").join("config.json"))
}
