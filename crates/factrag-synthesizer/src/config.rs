//! Configuration for citation rendering and question answering

use crate::citation::CitationStyle;
use serde::{Deserialize, Serialize};

/// Synthesizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Citation output style
    pub style: CitationStyle,

    /// Facts retrieved per question (negative retrieves all)
    pub facts_per_question: i64,

    /// Resolve fact citations in answers
    pub clean_sources: bool,

    /// Attempts for a whole question/answer round
    pub max_attempts: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            style: CitationStyle::Plain,
            facts_per_question: 10,
            clean_sources: true,
            max_attempts: 3,
        }
    }
}

impl SynthesizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.facts_per_question == 0 {
            return Err("facts_per_question must not be 0".to_string());
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
    fn test_default_is_valid() {
        assert!(SynthesizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = SynthesizerConfig {
            max_attempts: 0,
            ..SynthesizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = SynthesizerConfig::from_toml("style = \"html\"\nmax_attempts = 5\n").unwrap();
        assert_eq!(config.style, CitationStyle::Html);
        assert_eq!(config.max_attempts, 5);
        assert!(config.clean_sources);
    }
}
