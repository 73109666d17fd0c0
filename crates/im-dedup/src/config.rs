//! Configuration for label deduplication
//!
//! Loadable from TOML or JSON. Every field has a default, so a config file
//! only needs the settings it changes:
//!
//! ```toml
//! threshold = 60
//! shortest_first = true
//! normalization = "alphanumeric"
//! clustering = "transitive"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::{validate_threshold, DEFAULT_THRESHOLD};
use crate::error::{DedupError, DedupResult};
use crate::normalization::NormalizationMode;

/// How matching pairs become duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// The later label of each matching pair is dropped
    #[default]
    Pairwise,
    /// Matching pairs are merged into groups; only each group's earliest
    /// label is kept
    Transitive,
}

/// Deduplication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(uniffi::Record))]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum similarity score (0-100) for two labels to be the same entity
    pub threshold: u32,
    /// Sort labels by length before detection so the shortest variant survives
    pub shortest_first: bool,
    /// Label preprocessing before tokens are sorted
    pub normalization: NormalizationMode,
    /// Pairwise or transitive duplicate marking
    pub clustering: ClusterMode,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            shortest_first: false,
            normalization: NormalizationMode::default(),
            clustering: ClusterMode::default(),
        }
    }
}

impl DedupConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with a different threshold
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> DedupResult<Self> {
        toml::from_str(toml_str).map_err(|e| DedupError::Config(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> DedupResult<String> {
        toml::to_string_pretty(self).map_err(|e| DedupError::Config(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> DedupResult<Self> {
        serde_json::from_str(json_str).map_err(|e| DedupError::Config(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> DedupResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DedupError::Config(e.to_string()))
    }

    /// Read and validate a config file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> DedupResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DedupError::Io(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> DedupResult<()> {
        validate_threshold(self.threshold)
    }
}
