//! Error types for the Synthesizer

use factrag_llm::LlmError;
use factrag_store::StoreError;
use thiserror::Error;

/// Errors that can occur while resolving citations or answering questions
#[derive(Error, Debug)]
pub enum SynthError {
    /// A cited fact or source number does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The fact lookup collaborator failed
    #[error("Fact lookup failed: {0}")]
    Lookup(String),

    /// Fact store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Chat model error
    #[error("LLM error: {message}")]
    Llm {
        /// Error message
        message: String,
        /// Whether retrying the call might succeed
        retryable: bool,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl SynthError {
    /// Whether re-running the failed operation might succeed
    ///
    /// Communication failures are retryable; bad references and invalid
    /// input are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SynthError::Llm { retryable: true, .. })
    }
}

impl From<LlmError> for SynthError {
    fn from(err: LlmError) -> Self {
        SynthError::Llm {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(SynthError::from(LlmError::Communication("timeout".into())).is_retryable());
        assert!(SynthError::from(LlmError::RateLimitExceeded).is_retryable());
        assert!(!SynthError::from(LlmError::ModelNotAvailable("m".into())).is_retryable());
        assert!(!SynthError::NotFound("f9".into()).is_retryable());
        assert!(!SynthError::Store(StoreError::Validation("bad".into())).is_retryable());
    }
}
