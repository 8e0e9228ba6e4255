//! Component construction from configuration.

use crate::config::Config;
use crate::error::Result;
use factrag_extractor::{ConfiguredChunker, FactExtractor};
use factrag_ingest::HttpCrawler;
use factrag_llm::OllamaProvider;
use factrag_store::{ContentCache, FactStore};
use tracing::debug;

/// Fact store embedding through Ollama
pub type Store = FactStore<OllamaProvider>;

/// Content cache crawling over HTTP
pub type Cache = ContentCache<HttpCrawler>;

/// Extractor wired for live use
pub type Extractor = FactExtractor<ConfiguredChunker<OllamaProvider>, HttpCrawler, OllamaProvider>;

/// Chat model from `[llm]`.
pub fn chat_model(config: &Config) -> Result<OllamaProvider> {
    Ok(OllamaProvider::from_config(&config.llm)?)
}

/// Open the fact store under `[store] root`.
pub fn open_store(config: &Config) -> Result<Store> {
    let embedder = OllamaProvider::from_config(&config.llm)?;
    Ok(FactStore::open(&config.store, embedder)?)
}

/// Open the content cache; it shares the store's root folder.
pub fn open_cache(config: &Config) -> Result<Cache> {
    let crawler = HttpCrawler::new(&config.ingest)?;
    Ok(ContentCache::open(&config.store.root, crawler)?)
}

/// Cache, store and chunker together.
pub fn open_extractor(config: &Config) -> Result<Extractor> {
    let chunker = ConfiguredChunker::from_config(&config.extractor, chat_model(config)?)?;
    debug!(strategy = ?chunker.strategy(), root = %config.store.root.display(), "Opening extractor");
    Ok(FactExtractor::new(open_cache(config)?, open_store(config)?, chunker))
}
