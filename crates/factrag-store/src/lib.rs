//! factrag Storage Layer
//!
//! Durable storage for fetched web content and for extracted facts.
//!
//! # Architecture
//!
//! - [`ContentCache`]: SQLite metadata table plus `original/` and `parsed/`
//!   blob folders, keyed by the SHA-256 of the URI
//! - [`FactStore`]: append-only SQLite fact table, loaded eagerly into an
//!   exact in-memory [`VectorIndex`](vector_index::VectorIndex)
//! - Both databases carry a schema version (`PRAGMA user_version`)
//!
//! # Examples
//!
//! ```no_run
//! use factrag_store::{FactStore, QueryLimit, StoreConfig};
//! use factrag_store::embedding::MockEmbeddingModel;
//!
//! let config = StoreConfig::with_root("./knowledge");
//! let mut store = FactStore::open(&config, MockEmbeddingModel::new(64)).unwrap();
//! store.add_fact("Wheat futures rose 3% on Monday.", "https://news.example/wheat").unwrap();
//! let context = store.query_to_fact_content("wheat prices", QueryLimit::Top(10), None, false).unwrap();
//! println!("{}", context);
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod embedding;
pub mod fact_store;
mod schema;
pub mod vector_index;

pub use cache::ContentCache;
pub use config::{Distance, EmbeddingConfig, StoreConfig};
pub use fact_store::{FactStore, QueryLimit, RetrievedFact};

use thiserror::Error;
use vector_index::VectorIndexError;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Blob or folder I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The crawler failed for a URI
    #[error("Failed to fetch {uri}: {reason}")]
    Fetch {
        /// URI that could not be fetched
        uri: String,
        /// Crawler error message
        reason: String,
    },

    /// Malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fact ID or cache URI does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The on-disk store changed since it was loaded (strict mode)
    #[error("Stale write: {0}")]
    StaleWrite(String),

    /// The database was written by a newer version
    #[error("Unsupported schema version {found} (supported up to {supported})")]
    SchemaVersion {
        /// Version found on disk
        found: i64,
        /// Highest version this build understands
        supported: i64,
    },

    /// The embedding collaborator failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(#[from] VectorIndexError),

    /// Invalid data format on disk
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
