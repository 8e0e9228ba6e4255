//! Configuration for the fact store and content cache

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Distance metric used for nearest-neighbor search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// Euclidean distance
    #[default]
    L2,
    /// One minus cosine similarity
    Cosine,
}

/// Limits applied when sending text to the embedding model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Maximum texts per embedding request
    pub max_batch_size: usize,

    /// Token budget per text; longer texts are truncated before embedding
    pub max_tokens: usize,

    /// Characters removed from the end per truncation step
    pub truncate_step: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            max_tokens: 8000,
            truncate_step: 250,
        }
    }
}

/// Configuration for the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Folder holding `cache.db`, `facts.db` and the content blobs
    pub root: PathBuf,

    /// Fail (instead of warning) when another process wrote the store
    pub strict: bool,

    /// Distance metric for retrieval
    pub distance: Distance,

    /// Embedding request limits
    pub embedding: EmbeddingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("factrag-data"),
            strict: false,
            distance: Distance::L2,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Strict preset: concurrent modification is an error
    pub fn strict(root: impl AsRef<Path>) -> Self {
        Self {
            strict: true,
            ..Self::with_root(root)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("root must not be empty".to_string());
        }
        if self.embedding.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        if self.embedding.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        // Each step appends "...", so it must remove more than that
        if self.embedding.truncate_step <= 3 {
            return Err("truncate_step must be greater than 3".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
        assert!(StoreConfig::strict("/tmp/x").validate().is_ok());
    }

    #[test]
    fn test_invalid_truncate_step() {
        let mut config = StoreConfig::default();
        config.embedding.truncate_step = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_batch_size() {
        let mut config = StoreConfig::default();
        config.embedding.max_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StoreConfig::from_toml("root = \"/data/kb\"\ndistance = \"cosine\"\n").unwrap();
        assert_eq!(config.root, PathBuf::from("/data/kb"));
        assert_eq!(config.distance, Distance::Cosine);
        assert_eq!(config.embedding.max_batch_size, 100);
        assert!(!config.strict);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = StoreConfig::strict("/data/kb");
        let parsed = StoreConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
