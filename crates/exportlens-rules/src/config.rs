//! Engine configuration for the command-line front end.
//!
//! All fields have defaults, so an empty file is a valid config.
//!
//! ```toml
//! rule_version = "2023-10-17"
//! datacenter_marketed = true
//! catalog_path = "data/my_chips.json"
//! output = "json"
//! ```

use crate::rule_history::RuleVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Front-end configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rule version used when none is given on the command line
    #[serde(default)]
    pub rule_version: RuleVersion,

    /// Default datacenter-marketed flag for ad-hoc calculations
    #[serde(default = "default_true")]
    pub datacenter_marketed: bool,

    /// External catalog file; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub output: OutputFormat,
}

fn default_true() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_version: RuleVersion::current(),
            datacenter_marketed: default_true(),
            catalog_path: None,
            output: OutputFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file.
    pub fn from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Datacenter flag for an ad-hoc calculation; an explicit choice wins.
    pub fn resolve_datacenter(&self, explicit: Option<bool>) -> bool {
        explicit.unwrap_or(self.datacenter_marketed)
    }
}

/// Errors from config loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error loading config from {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Parse error in config {path}: {error}")]
    Parse { path: PathBuf, error: String },
}
