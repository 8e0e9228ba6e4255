//! Configuration for the Extractor

use crate::prompt::PromptSet;
use serde::{Deserialize, Serialize};

/// How raw content is turned into facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Ask the chat model for marker-bulleted facts
    #[default]
    Llm,
    /// Keep each sufficiently long line verbatim
    Lines,
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Chunking strategy
    pub strategy: ChunkStrategy,

    /// Minimum trimmed line length kept by the line chunker (characters)
    pub min_line_length: usize,

    /// Bullet marker the LLM puts in front of each fact
    pub fact_marker: String,

    /// Language all facts are written (or translated) in
    pub target_language: String,

    /// Largest piece of content sent to the LLM in one request (characters)
    pub max_window_chars: usize,

    /// Prompt templates
    pub prompts: PromptSet,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Llm,
            min_line_length: 7,
            fact_marker: "--- ".to_string(),
            target_language: "ENGLISH".to_string(),
            max_window_chars: 20_000,
            prompts: PromptSet::default(),
        }
    }
}

impl ExtractorConfig {
    /// Deterministic preset: no LLM calls
    pub fn lines() -> Self {
        Self {
            strategy: ChunkStrategy::Lines,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fact_marker.trim().is_empty() {
            return Err("fact_marker must contain a visible character".to_string());
        }
        if self.target_language.trim().is_empty() {
            return Err("target_language must not be empty".to_string());
        }
        if self.max_window_chars == 0 {
            return Err("max_window_chars must be greater than 0".to_string());
        }
        self.prompts.validate()
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
