//! Configuration for lang2vec-core
//!
//! Locates the shipped data directory and names the auxiliary files inside
//! it. Loaded once and passed by reference; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Lang2VecError, Result};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "LANG2VEC_DATA_DIR";

/// Library configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lang2VecConfig {
    /// Directory holding the `.npz` stores and the alias table
    pub data_dir: PathBuf,
    /// Alias table file name (2-letter -> 3-letter codes)
    pub letter_codes_file: String,
    /// Learned embedding table file name
    pub learned_file: String,
    /// Expected width of every learned embedding
    pub learned_dimension: usize,
    /// Display token for missing values
    pub missing_token: String,
    /// Reserved output key for the header row
    pub header_key: String,
}

impl Default for Lang2VecConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            letter_codes_file: "letter_codes.json".to_string(),
            learned_file: "learned.npz".to_string(),
            learned_dimension: 512,
            missing_token: "--".to_string(),
            header_key: "CODE".to_string(),
        }
    }
}

impl Lang2VecConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Find the data directory from the environment
    ///
    /// Checks `LANG2VEC_DATA_DIR`, then `<user data dir>/lang2vec`, then
    /// falls back to `./data`.
    pub fn discover() -> Self {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return Self::with_data_dir(dir);
            }
        }

        if let Some(dir) = dirs::data_dir().map(|d| d.join("lang2vec")) {
            if dir.is_dir() {
                return Self::with_data_dir(dir);
            }
        }

        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| Lang2VecError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Lang2VecError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Lang2VecError::Config(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.learned_dimension == 0 {
            return Err(Lang2VecError::Config(
                "learned_dimension must be positive".to_string(),
            ));
        }

        if self.header_key.is_empty() {
            return Err(Lang2VecError::Config(
                "header_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of a file inside the data directory
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Full path of the alias table
    pub fn letter_codes_path(&self) -> PathBuf {
        self.data_path(&self.letter_codes_file)
    }

    /// Full path of the learned embedding table
    pub fn learned_path(&self) -> PathBuf {
        self.data_path(&self.learned_file)
    }
}
