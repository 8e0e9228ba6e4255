//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the fact cache and the
//! services it wraps. Implementations live in other crates.

use crate::{ChatMessage, Fact, FactId, SearchHit};

/// Trait for chat-completion LLMs
///
/// Implemented by the infrastructure layer (factrag-llm)
pub trait ChatModel {
    /// Error type for LLM operations
    type Error;

    /// Send a message list and get back the completion text
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, Self::Error>;
}

/// Trait for text embedding models
///
/// Implemented by factrag-llm (remote models) and factrag-store (mock)
pub trait EmbeddingModel {
    /// Error type for embedding operations
    type Error;

    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Generate embeddings for a batch of texts, in order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Dimension of embeddings produced by this model
    fn dimension(&self) -> usize;

    /// Approximate number of model tokens in `text` (4 chars ~ 1 token)
    fn token_count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Raw and text-extracted content of a fetched URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    /// Raw HTML (or raw text for non-HTML documents)
    pub raw: String,
    /// Extracted plain text
    pub text: String,
}

/// Trait for fetching web content
///
/// Implemented by factrag-ingest
pub trait Crawler {
    /// Error type for fetch failures
    type Error;

    /// Fetch a URI and extract its plain text
    fn fetch(&self, uri: &str) -> Result<FetchedContent, Self::Error>;
}

/// Trait for splitting raw content into atomic facts
///
/// Implemented by factrag-extractor. Chunkers return an empty list for
/// empty or unusable content rather than failing.
pub trait Chunker {
    /// Error type for collaborator failures (e.g. the LLM is unreachable)
    type Error;

    /// Turn `content` into fact strings, focusing on `topic`
    fn chunk(&self, content: &str, topic: &str) -> Result<Vec<String>, Self::Error>;
}

/// Trait for discovering candidate URIs
///
/// Implemented by factrag-ingest (web search, news search, RSS)
pub trait SourceDiscovery {
    /// Error type for discovery failures
    type Error;

    /// Find candidate sources for a query or feed location
    fn discover(&self, query: &str) -> Result<Vec<SearchHit>, Self::Error>;
}

/// Trait for point lookups of stored facts
///
/// Implemented by factrag-store
pub trait FactLookup {
    /// Error type for lookup failures
    type Error;

    /// Get a fact by ID, `None` if no such fact exists
    fn lookup_fact(&self, id: FactId) -> Result<Option<Fact>, Self::Error>;
}

impl<T: FactLookup + ?Sized> FactLookup for &T {
    type Error = T::Error;

    fn lookup_fact(&self, id: FactId) -> Result<Option<Fact>, Self::Error> {
        (**self).lookup_fact(id)
    }
}

impl<T: ChatModel + ?Sized> ChatModel for &T {
    type Error = T::Error;

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, Self::Error> {
        (**self).complete(messages)
    }
}
