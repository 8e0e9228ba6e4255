//! factrag LLM Provider Layer
//!
//! Implementations of the `ChatModel` and `EmbeddingModel` traits from
//! `factrag-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Ollama HTTP API (chat and embeddings)
//!
//! # Examples
//!
//! ```
//! use factrag_domain::traits::ChatModel;
//! use factrag_domain::ChatMessage;
//! use factrag_llm::MockProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete(&[ChatMessage::user("test prompt")]).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use factrag_domain::traits::ChatModel;
use factrag_domain::{ChatMessage, Role};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::{OllamaConfig, OllamaProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Invalid provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, String>,
    errors: HashSet<String>,
    queued: VecDeque<Result<String, String>>,
    call_count: usize,
    last_messages: Vec<ChatMessage>,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are chosen, in order of precedence, from the queue of scripted
/// results, from the per-prompt table (keyed by the last user message), or
/// the default response. No network calls are made.
///
/// # Examples
///
/// ```
/// use factrag_domain::traits::ChatModel;
/// use factrag_domain::ChatMessage;
/// use factrag_llm::MockProvider;
///
/// let provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.complete(&[ChatMessage::user("prompt1")]).unwrap(), "response1");
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    // A poisoned lock only means another test thread panicked mid-call
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a specific response for a given user prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state().responses.insert(prompt.into(), response.into());
    }

    /// Configure to return an error for a specific user prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.state().errors.insert(prompt.into());
    }

    /// Queue a response returned by the next call, regardless of prompt
    pub fn queue_response(&self, response: impl Into<String>) {
        self.state().queued.push_back(Ok(response.into()));
    }

    /// Queue a communication failure for the next call
    pub fn queue_error(&self, message: impl Into<String>) {
        self.state().queued.push_back(Err(message.into()));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.state().call_count
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.state().call_count = 0;
    }

    /// Messages received by the most recent call
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.state().last_messages.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatModel for MockProvider {
    type Error = LlmError;

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.call_count += 1;
        state.last_messages = messages.to_vec();

        if let Some(scripted) = state.queued.pop_front() {
            return scripted.map_err(LlmError::Communication);
        }

        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if state.errors.contains(prompt) {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        if let Some(response) = state.responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(provider: &MockProvider, prompt: &str) -> Result<String, LlmError> {
        provider.complete(&[ChatMessage::system("sys"), ChatMessage::user(prompt)])
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        assert_eq!(ask(&provider, "any prompt").unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(ask(&provider, "hello").unwrap(), "world");
        assert_eq!(ask(&provider, "foo").unwrap(), "bar");
        assert_eq!(ask(&provider, "unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        ask(&provider, "prompt1").unwrap();
        ask(&provider, "prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = ask(&provider, "bad prompt");
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[test]
    fn test_mock_provider_queue_takes_precedence() {
        let provider = MockProvider::new("default");
        provider.add_response("p", "table");
        provider.queue_error("timeout");
        provider.queue_response("scripted");

        assert!(matches!(ask(&provider, "p"), Err(LlmError::Communication(_))));
        assert_eq!(ask(&provider, "p").unwrap(), "scripted");
        assert_eq!(ask(&provider, "p").unwrap(), "table");
    }

    #[test]
    fn test_mock_provider_records_messages() {
        let provider = MockProvider::default();
        ask(&provider, "question").unwrap();
        let messages = provider.last_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "question");
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();
        ask(&provider1, "test").unwrap();
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_error_retryable_classification() {
        assert!(LlmError::Communication("reset".into()).is_retryable());
        assert!(LlmError::RateLimitExceeded.is_retryable());
        assert!(!LlmError::ModelNotAvailable("m".into()).is_retryable());
        assert!(!LlmError::InvalidResponse("x".into()).is_retryable());
    }
}
