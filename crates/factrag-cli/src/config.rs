//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use factrag_extractor::ExtractorConfig;
use factrag_ingest::IngestConfig;
use factrag_llm::OllamaConfig;
use factrag_store::StoreConfig;
use factrag_synthesizer::SynthesizerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, one table per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub settings: Settings,

    /// Fact store and content cache
    pub store: StoreConfig,

    /// Fact extraction
    pub extractor: ExtractorConfig,

    /// Crawling and discovery
    pub ingest: IngestConfig,

    /// Chat and embedding models
    pub llm: OllamaConfig,

    /// Citation rendering and question answering
    pub synthesizer: SynthesizerConfig,

    /// Search API credentials
    pub search: SearchKeys,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Credentials for the discovery services.
///
/// Command-line flags and environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchKeys {
    /// Google Custom Search API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,

    /// Google Custom Search engine ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_id: Option<String>,

    /// NewsAPI key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsapi_key: Option<String>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Default configuration file path (`~/.factrag/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".factrag").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every component configuration.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("store", self.store.validate()),
            ("extractor", self.extractor.validate()),
            ("ingest", self.ingest.validate()),
            ("llm", self.llm.validate()),
            ("synthesizer", self.synthesizer.validate()),
        ];
        for (table, check) in checks {
            check.map_err(|e| CliError::Config(format!("[{}] {}", table, e)))?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
