//! Error types for ingestion

use thiserror::Error;

/// Errors that can occur while crawling or discovering sources
#[derive(Error, Debug)]
pub enum IngestError {
    /// Network or HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The service answered with an unexpected payload
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service reported an error in its payload
    #[error("API error: {0}")]
    Api(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
