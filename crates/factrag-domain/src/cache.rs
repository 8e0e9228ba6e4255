//! Content cache metadata

use chrono::{DateTime, Utc};

/// Access-tracking metadata for one cached URI
///
/// An entry exists only when both the original and the parsed content blobs
/// are stored under `uri_hash`. Entries are never deleted; only the access
/// fields change.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The cached URI (unique key)
    pub uri: String,

    /// Content-addressed local file name derived from the URI
    pub uri_hash: String,

    /// When the content was first obtained
    pub obtained_on: DateTime<Utc>,

    /// When the content was last used
    pub last_accessed: DateTime<Utc>,

    /// Whether a consumer has used this content yet
    pub accessed: bool,
}

impl CacheEntry {
    /// Create a fresh, not-yet-accessed entry
    pub fn new(
        uri: impl Into<String>,
        uri_hash: impl Into<String>,
        obtained_on: DateTime<Utc>,
    ) -> Result<Self, String> {
        let uri = uri.into();
        let uri_hash = uri_hash.into();
        if uri.is_empty() {
            return Err("Cache entry URI cannot be empty".to_string());
        }
        if uri_hash.is_empty() {
            return Err("Cache entry hash cannot be empty".to_string());
        }
        Ok(Self {
            uri,
            uri_hash,
            obtained_on,
            last_accessed: obtained_on,
            accessed: false,
        })
    }

    /// Mark the entry as used at the given time
    pub fn mark_accessed(&mut self, at: DateTime<Utc>) {
        self.accessed = true;
        self.last_accessed = at;
    }
}
