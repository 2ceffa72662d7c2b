//! Configuration system
//!
//! The loader consults a flat key-value store shared with the rest of the
//! application. Two keys matter here:
//!
//! - `BSATextureScan`: the string `"true"` enables the archive fallback
//! - `GameDataPath`: base directory stripped from texture paths before
//!   looking them up inside archives

use std::collections::BTreeMap;
use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// Key enabling texture lookup inside mounted game archives
pub const BSA_TEXTURE_SCAN: &str = "BSATextureScan";

/// Key holding the game's data directory
pub const GAME_DATA_PATH: &str = "GameDataPath";

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Flat string key-value configuration store
///
/// Values are compared as plain strings, so `BSATextureScan = "True"`
/// does not enable the archive fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigStore {
    values: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a value, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Check whether `key` holds exactly `value`
    pub fn match_value(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Whether textures may be resolved from mounted archives
    pub fn bsa_texture_scan(&self) -> bool {
        self.match_value(BSA_TEXTURE_SCAN, "true")
    }

    /// The configured game data directory, if set and non-empty
    pub fn game_data_path(&self) -> Option<&str> {
        self.get(GAME_DATA_PATH).filter(|path| !path.is_empty())
    }
}

impl Config for ConfigStore {}
