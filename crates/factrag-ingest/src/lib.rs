//! factrag Source Ingestion
//!
//! Discovers candidate URIs (web search, news search, RSS/Atom feeds) and
//! routes the unseen ones through the content cache into fact extraction.
//!
//! # Architecture
//!
//! ```text
//! SourceDiscovery → IngestionDriver → FactExtractor (cache → chunker → store)
//! ```
//!
//! A single failing URI or query is logged and recorded in the
//! [`IngestReport`]; it never aborts the run.

#![warn(missing_docs)]

mod config;
mod crawler;
mod discovery;
mod driver;
mod error;

pub use config::IngestConfig;
pub use crawler::{html_to_text, HttpCrawler};
pub use discovery::{
    parse_feed_links, parse_google_results, parse_news_results, GoogleSearch, NewsApi, RssFeed,
    GOOGLE_SEARCH_ENDPOINT, NEWSAPI_EVERYTHING_ENDPOINT, NEWSAPI_HEADLINES_ENDPOINT,
};
pub use driver::{IngestReport, IngestionDriver};
pub use error::IngestError;

/// Build the blocking HTTP client shared by crawler and discovery adapters
pub fn http_client(config: &IngestConfig) -> Result<reqwest::blocking::Client, IngestError> {
    config.validate().map_err(IngestError::Config)?;
    reqwest::blocking::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(IngestError::Http)
}
