//! Configuration for crawling and discovery

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Results requested per search query
    pub results_per_query: usize,

    /// Use NewsAPI top headlines instead of the full archive
    pub top_headlines: bool,

    /// Maximum links taken from one feed
    pub feed_item_limit: usize,

    /// Cache an empty entry for URIs whose fetch fails, so they are not retried
    pub force_empty_on_fetch_error: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("factrag/", env!("CARGO_PKG_VERSION")).to_string(),
            results_per_query: 10,
            top_headlines: false,
            feed_item_limit: 50,
            force_empty_on_fetch_error: false,
        }
    }
}

impl IngestConfig {
    /// Whole-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }
        if self.connect_timeout_secs > self.timeout_secs {
            return Err("connect_timeout_secs cannot exceed timeout_secs".to_string());
        }
        // Google Custom Search caps num at 10
        if self.results_per_query == 0 || self.results_per_query > 10 {
            return Err("results_per_query must be between 1 and 10".to_string());
        }
        if self.feed_item_limit == 0 {
            return Err("feed_item_limit must be greater than 0".to_string());
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
