//! Configuration file for Tally (`~/.tally/config.toml`).
//!
//! Every field has a default so an empty or missing file is a valid config.

use crate::defaults::*;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write config: {0}")]
    Write(String),

    #[error("Invalid player ID in [review].adjudicators: {0}")]
    Adjudicator(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub review: ReviewSection,

    #[serde(default)]
    pub ocr: OcrSection,

    #[serde(default)]
    pub ledger: LedgerSection,
}

/// Player name registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Path to the SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

/// Review-surface timing and who may adjudicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSection {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Player ids holding the elevated permission.
    #[serde(default)]
    pub adjudicators: Vec<String>,
}

/// Image normalization and text recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

/// External spreadsheet ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    #[serde(default)]
    pub spreadsheet_id: String,

    #[serde(default = "default_range")]
    pub range: String,

    /// Environment variable holding the OAuth bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_database_path() -> PathBuf {
    paths::default_registry_path()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REVIEW_TIMEOUT_SECS
}

fn default_retention_secs() -> u64 {
    DEFAULT_SESSION_RETENTION_SECS
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from(DEFAULT_TESSERACT_PATH)
}

fn default_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_IMAGE_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_IMAGE_HEIGHT
}

fn default_range() -> String {
    DEFAULT_LEDGER_RANGE.to_string()
}

fn default_token_env() -> String {
    DEFAULT_SHEETS_TOKEN_ENV.to_string()
}

fn default_api_base() -> String {
    DEFAULT_SHEETS_API_BASE.to_string()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retention_secs: default_retention_secs(),
            adjudicators: Vec::new(),
        }
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            tesseract_path: default_tesseract_path(),
            language: default_language(),
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: default_range(),
            token_env: default_token_env(),
            api_base: default_api_base(),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write(e.to_string()))?;
        Ok(())
    }
}

impl ReviewSection {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn retention(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retention_secs)
    }

    /// Parse the configured adjudicator ids.
    pub fn adjudicator_ids(&self) -> Result<Vec<tally_ids::PlayerId>, ConfigError> {
        self.adjudicators
            .iter()
            .map(|raw| {
                tally_ids::PlayerId::parse(raw).map_err(|_| ConfigError::Adjudicator(raw.clone()))
            })
            .collect()
    }
}
