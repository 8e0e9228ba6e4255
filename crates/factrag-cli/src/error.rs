//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fact store or cache error
    #[error("Store error: {0}")]
    Store(#[from] factrag_store::StoreError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extract(#[from] factrag_extractor::ExtractorError),

    /// Crawling or discovery error
    #[error("Ingestion error: {0}")]
    Ingest(#[from] factrag_ingest::IngestError),

    /// Citation or question answering error
    #[error("{0}")]
    Synth(#[from] factrag_synthesizer::SynthError),

    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] factrag_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
