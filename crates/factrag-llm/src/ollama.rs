//! Ollama Provider Implementation
//!
//! Chat completions (`/api/chat`) and embeddings (`/api/embed`) served by an
//! Ollama instance.
//!
//! # Features
//!
//! - Blocking HTTP with explicit, configurable timeouts
//! - Retry with exponential backoff on communication failures
//!
//! # Examples
//!
//! ```no_run
//! use factrag_domain::traits::ChatModel;
//! use factrag_domain::ChatMessage;
//! use factrag_llm::{OllamaConfig, OllamaProvider};
//!
//! let provider = OllamaProvider::from_config(&OllamaConfig::default()).unwrap();
//! let answer = provider.complete(&[ChatMessage::user("Say hello")]).unwrap();
//! ```

use crate::LlmError;
use factrag_domain::traits::{ChatModel, EmbeddingModel};
use factrag_domain::ChatMessage;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings for [`OllamaProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API base URL
    pub endpoint: String,
    /// Model used for chat completions
    pub chat_model: String,
    /// Model used for embeddings
    pub embedding_model: String,
    /// Length of vectors returned by `embedding_model`
    pub embedding_dimension: usize,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
    /// Attempts per request
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            chat_model: "llama3.1".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimension: 768,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl OllamaConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.chat_model.is_empty() || self.embedding_model.is_empty() {
            return Err("model names must not be empty".to_string());
        }
        if self.embedding_dimension == 0 {
            return Err("embedding_dimension must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Ollama API provider
pub struct OllamaProvider {
    endpoint: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimension: usize,
    client: Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaProvider {
    /// Create a provider from configuration
    pub fn from_config(config: &OllamaConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            embedding_dimension: config.embedding_dimension,
            client,
            max_retries: config.max_retries,
        })
    }

    /// Create a provider for the default endpoint with the given chat model
    pub fn default_endpoint(chat_model: impl Into<String>) -> Result<Self, LlmError> {
        Self::from_config(&OllamaConfig {
            chat_model: chat_model.into(),
            ..OllamaConfig::default()
        })
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// POST `body` to `path`, retrying communication failures
    fn post<B, R>(&self, path: &str, body: &B, model: &str) -> Result<R, LlmError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(body).send() {
                Ok(response) if response.status().is_success() => {
                    return response.json::<R>().map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                }
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(LlmError::RateLimitExceeded);
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response
                        .text()
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(url = %url, attempt = attempts, ?delay, "Retrying Ollama request");
                thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl ChatModel for OllamaProvider {
    type Error = LlmError;

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, Self::Error> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: false,
        };
        debug!(messages = messages.len(), model = %self.chat_model, "Chat completion");
        let response: ChatResponse = self.post("/api/chat", &request, &self.chat_model)?;
        Ok(response.message.content)
    }
}

impl EmbeddingModel for OllamaProvider {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| LlmError::InvalidResponse("No embedding returned".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbedRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let response: EmbedResponse = self.post("/api/embed", &request, &self.embedding_model)?;

        if response.embeddings.len() != texts.len() {
            return Err(LlmError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        if let Some(bad) = response
            .embeddings
            .iter()
            .find(|e| e.len() != self.embedding_dimension)
        {
            return Err(LlmError::InvalidResponse(format!(
                "Expected dimension {}, got {}",
                self.embedding_dimension,
                bad.len()
            )));
        }
        Ok(response.embeddings)
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }
}
