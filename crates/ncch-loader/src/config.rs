//! Loader configuration (loader.toml)
//!
//! ```toml
//! [loader]
//! sdmc_dir = "/home/user/.local/share/emu/sdmc"
//! region = "auto"   # or a region code 0..=6
//! ```

use ncch_format::region::REGION_COUNT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Console region selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegionValue", into = "RegionValue")]
pub enum RegionSetting {
    /// Pick the region from the title being loaded
    #[default]
    Auto,
    /// Always use this region code
    Fixed(u32),
}

/// On-disk form of [`RegionSetting`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RegionValue {
    Name(String),
    Code(u32),
}

impl TryFrom<RegionValue> for RegionSetting {
    type Error = String;

    fn try_from(value: RegionValue) -> Result<Self, Self::Error> {
        match value {
            RegionValue::Name(name) if name.eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            RegionValue::Name(name) => Err(format!(
                "unknown region '{}', expected \"auto\" or a region code",
                name
            )),
            RegionValue::Code(code) => Ok(Self::Fixed(code)),
        }
    }
}

impl From<RegionSetting> for RegionValue {
    fn from(setting: RegionSetting) -> Self {
        match setting {
            RegionSetting::Auto => RegionValue::Name("auto".to_string()),
            RegionSetting::Fixed(code) => RegionValue::Code(code),
        }
    }
}

/// Loader configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    /// Loader settings
    #[serde(default)]
    pub loader: LoaderSettings,
}

/// `[loader]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoaderSettings {
    /// Emulated SD card root, where update titles are installed
    #[serde(default = "default_sdmc_dir")]
    pub sdmc_dir: PathBuf,

    /// Console region selection
    #[serde(default)]
    pub region: RegionSetting,
}

fn default_sdmc_dir() -> PathBuf {
    PathBuf::from("sdmc")
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            sdmc_dir: default_sdmc_dir(),
            region: RegionSetting::Auto,
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoaderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let RegionSetting::Fixed(code) = self.loader.region {
            if code >= REGION_COUNT {
                return Err(ConfigError::ValidationError(format!(
                    "region code {} out of range (0..={})",
                    code,
                    REGION_COUNT - 1
                )));
            }
        }

        if self.loader.sdmc_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "sdmc_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Write the configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
