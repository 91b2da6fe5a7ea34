//! Search configuration.
//!
//! Every field has a default, so an empty TOML document (or a missing file)
//! yields the stock configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How the transposition table chooses which entry to overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// A depth-preferred slot plus an always-replace slot per index.
    #[default]
    TwoTier,
    /// One slot per index, overwritten by every store.
    AlwaysReplace,
}

/// Tunable search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Transposition table size in megabytes. Defaults to 64.
    #[serde(default = "default_hash_size_mb")]
    pub hash_size_mb: usize,
    #[serde(default)]
    pub replacement: ReplacementPolicy,
    /// Deepest iteration started. Defaults to 100.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Full width of the aspiration window around the previous score.
    #[serde(default = "default_aspiration_window")]
    pub aspiration_window: i32,
    /// Widening per consecutive aspiration failure.
    #[serde(default = "default_aspiration_step")]
    pub aspiration_step: i32,
    /// First move index (0-based) eligible for late move reduction.
    #[serde(default = "default_lmr_min_move_index")]
    pub lmr_min_move_index: usize,
    /// Smallest remaining depth at which moves are reduced.
    #[serde(default = "default_lmr_min_depth")]
    pub lmr_min_depth: i32,
    /// Milliseconds held back from every time budget.
    #[serde(default)]
    pub move_overhead_ms: u64,
}

fn default_hash_size_mb() -> usize {
    64
}

fn default_max_depth() -> u32 {
    100
}

fn default_aspiration_window() -> i32 {
    50
}

fn default_aspiration_step() -> i32 {
    75
}

fn default_lmr_min_move_index() -> usize {
    3
}

fn default_lmr_min_depth() -> i32 {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            hash_size_mb: default_hash_size_mb(),
            replacement: ReplacementPolicy::default(),
            max_depth: default_max_depth(),
            aspiration_window: default_aspiration_window(),
            aspiration_step: default_aspiration_step(),
            lmr_min_move_index: default_lmr_min_move_index(),
            lmr_min_depth: default_lmr_min_depth(),
            move_overhead_ms: 0,
        }
    }
}

impl SearchConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration file, falling back to the defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }
}
