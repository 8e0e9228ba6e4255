//! Main Extractor implementation

use crate::error::ExtractorError;
use factrag_domain::traits::{Chunker, Crawler, EmbeddingModel};
use factrag_store::{ContentCache, FactStore};
use std::fmt::Display;
use tracing::info;

/// Pulls content through the cache, chunks it and stores the facts
pub struct FactExtractor<K, C, E> {
    cache: ContentCache<C>,
    store: FactStore<E>,
    chunker: K,
}

impl<K, C, E> FactExtractor<K, C, E>
where
    K: Chunker,
    K::Error: Display,
    C: Crawler,
    C::Error: Display,
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Create a new extractor
    pub fn new(cache: ContentCache<C>, store: FactStore<E>, chunker: K) -> Self {
        Self { cache, store, chunker }
    }

    /// Extract facts from the (cached or freshly crawled) text of `url`
    ///
    /// Every fact gets `url` as its source. Returns false when the content
    /// yields no facts; nothing is written in that case.
    pub fn facts_from_url(&mut self, url: &str, topic: &str) -> Result<bool, ExtractorError> {
        let content = self.cache.get(url)?;
        self.extract_and_store(url, &content, topic)
    }

    /// Seed content obtained through another channel, then extract from it
    ///
    /// Returns false without extracting if the URI is already cached, since
    /// its facts were taken when it was first cached.
    pub fn facts_from_content(
        &mut self,
        uri: &str,
        content: &str,
        topic: &str,
    ) -> Result<bool, ExtractorError> {
        if !self.cache.force_content(uri, content, true)? {
            info!(uri, "Already cached, skipping extraction");
            return Ok(false);
        }
        self.extract_and_store(uri, content, topic)
    }

    fn extract_and_store(&mut self, uri: &str, content: &str, topic: &str) -> Result<bool, ExtractorError> {
        let facts = self
            .chunker
            .chunk(content, topic)
            .map_err(|e| ExtractorError::Chunk(e.to_string()))?;

        if facts.is_empty() {
            info!(uri, "No facts extracted");
            return Ok(false);
        }

        let sources = vec![uri.to_string(); facts.len()];
        let ids = self.store.add_facts(&facts, &sources)?;
        info!(uri, facts = ids.len(), "Extracted facts");
        Ok(true)
    }
}

impl<K, C, E> FactExtractor<K, C, E> {
    /// The content cache
    pub fn cache(&self) -> &ContentCache<C> {
        &self.cache
    }

    /// The fact store
    pub fn store(&self) -> &FactStore<E> {
        &self.store
    }

    /// Mutable access to the fact store
    pub fn store_mut(&mut self) -> &mut FactStore<E> {
        &mut self.store
    }

    /// The chunker
    pub fn chunker(&self) -> &K {
        &self.chunker
    }

    /// Take the parts back
    pub fn into_parts(self) -> (ContentCache<C>, FactStore<E>, K) {
        (self.cache, self.store, self.chunker)
    }
}
