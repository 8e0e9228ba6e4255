//! Error types for the Extractor

use factrag_store::StoreError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chunker collaborator error
    #[error("Chunker error: {0}")]
    Chunk(String),

    /// Cache or fact store error (fetch failures included)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the error is a crawler failure for the URI being extracted
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, ExtractorError::Store(StoreError::Fetch { .. }))
    }
}
