//! factrag Extractor
//!
//! Turns raw scraped text into atomic, sourced facts.
//!
//! # Architecture
//!
//! ```text
//! URI → ContentCache → Chunker (LLM or lines) → FactStore
//! ```
//!
//! # Chunking strategies
//!
//! - **LLM**: the model emits one fact per line behind a bullet marker
//!   (`"--- "`); every other line of its answer is discarded
//! - **Lines**: deterministic, no model call; each trimmed line at least
//!   `min_line_length` characters long is a fact
//!
//! # Example Usage
//!
//! ```no_run
//! use factrag_extractor::{ConfiguredChunker, ExtractorConfig, FactExtractor};
//! use factrag_llm::MockProvider;
//! # use factrag_domain::traits::{Crawler, FetchedContent};
//! use factrag_store::embedding::MockEmbeddingModel;
//! use factrag_store::{ContentCache, FactStore, StoreConfig};
//! # struct Offline;
//! # impl Crawler for Offline {
//! #     type Error = String;
//! #     fn fetch(&self, uri: &str) -> Result<FetchedContent, String> { Err(uri.to_string()) }
//! # }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store_config = StoreConfig::with_root("./knowledge");
//! let cache = ContentCache::open(&store_config.root, Offline)?;
//! let store = FactStore::open(&store_config, MockEmbeddingModel::new(64))?;
//! let llm = MockProvider::new("--- Wheat rose 3% on Monday.");
//! let chunker = ConfiguredChunker::from_config(&ExtractorConfig::default(), llm)?;
//!
//! let mut extractor = FactExtractor::new(cache, store, chunker);
//! let added = extractor.facts_from_content(
//!     "https://news.example/wheat",
//!     "Wheat futures rose 3% on Monday after the USDA report.",
//!     "wheat prices",
//! )?;
//! println!("Added facts: {}", added);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;


pub use chunking::{split_into_windows, ConfiguredChunker, LineChunker, LlmChunker};
pub use config::{ChunkStrategy, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::FactExtractor;
pub use parser::parse_marked_lines;
pub use prompt::PromptSet;
