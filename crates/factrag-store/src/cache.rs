//! Content Cache
//!
//! Deduplicates and persists fetched web content and tracks whether a
//! downstream consumer has used it yet.
//!
//! # Layout
//!
//! ```text
//! <root>/cache.db            cache_entries metadata
//! <root>/original/<hash>     raw HTML (or raw text)
//! <root>/parsed/<hash>       extracted plain text
//! ```
//!
//! Blobs are written before the metadata row, so an entry never exists
//! without both of its blobs.

use crate::schema::{migrate, sha256_hex, timestamp_from_sql, timestamp_to_sql};
use crate::{Result, StoreError};
use chrono::{DateTime, Utc};
use factrag_domain::traits::Crawler;
use factrag_domain::CacheEntry;
use rusqlite::{params, Connection, OptionalExtension};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CACHE_DB: &str = "cache.db";
const ORIGINAL_DIR: &str = "original";
const PARSED_DIR: &str = "parsed";
const CACHE_SCHEMA_VERSION: i64 = 1;

/// Durable URI-keyed content cache backed by a crawler
///
/// # Examples
///
/// ```no_run
/// use factrag_domain::traits::{Crawler, FetchedContent};
/// use factrag_store::ContentCache;
///
/// struct Offline;
///
/// impl Crawler for Offline {
///     type Error = String;
///     fn fetch(&self, uri: &str) -> Result<FetchedContent, String> {
///         Err(format!("offline: {}", uri))
///     }
/// }
///
/// let cache = ContentCache::open("./knowledge", Offline).unwrap();
/// cache.force_content("https://a.example", "Seeded text", true).unwrap();
/// assert!(cache.in_cache("https://a.example").unwrap());
/// ```
pub struct ContentCache<C> {
    root: PathBuf,
    conn: Connection,
    crawler: C,
}

impl<C> ContentCache<C> {
    /// Open (or create) a cache under `root`
    pub fn open(root: impl AsRef<Path>, crawler: C) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(ORIGINAL_DIR))?;
        fs::create_dir_all(root.join(PARSED_DIR))?;

        let conn = Connection::open(root.join(CACHE_DB))?;
        migrate(&conn, include_str!("cache_schema.sql"), CACHE_SCHEMA_VERSION)?;

        Ok(Self { root, conn, crawler })
    }

    /// The crawler used for cache misses
    pub fn crawler(&self) -> &C {
        &self.crawler
    }

    /// Folder holding the cache
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local blob name for a URI
    pub fn uri_hash(uri: &str) -> String {
        sha256_hex(uri)
    }

    /// True iff an entry exists for `uri`. No network access.
    pub fn in_cache(&self, uri: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM cache_entries WHERE uri = ?1",
                params![uri],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Metadata for `uri`, if cached
    pub fn entry(&self, uri: &str) -> Result<Option<CacheEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT uri, uri_hash, obtained_on, last_accessed, accessed
                 FROM cache_entries WHERE uri = ?1",
                params![uri],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(uri, uri_hash, obtained_on, last_accessed, accessed)| {
            Ok(CacheEntry {
                uri,
                uri_hash,
                obtained_on: timestamp_from_sql(&obtained_on)?,
                last_accessed: timestamp_from_sql(&last_accessed)?,
                accessed,
            })
        })
        .transpose()
    }

    /// Stored plain text for a cached URI
    pub fn read_cached(&self, uri: &str) -> Result<String> {
        self.read_blob(uri, PARSED_DIR)
    }

    /// Stored raw content for a cached URI
    pub fn read_original(&self, uri: &str) -> Result<String> {
        self.read_blob(uri, ORIGINAL_DIR)
    }

    fn read_blob(&self, uri: &str, folder: &str) -> Result<String> {
        let entry = self
            .entry(uri)?
            .ok_or_else(|| StoreError::NotFound(format!("URI not cached: {}", uri)))?;
        Ok(fs::read_to_string(self.root.join(folder).join(entry.uri_hash))?)
    }

    /// Insert caller-supplied text as both original and parsed content
    ///
    /// Returns false without changing anything when `skip_if_present` is set
    /// and the URI is already cached. Forced content arrives through a channel
    /// that has already consumed it, so the entry is marked accessed.
    pub fn force_content(&self, uri: &str, content: &str, skip_if_present: bool) -> Result<bool> {
        if skip_if_present && self.in_cache(uri)? {
            debug!(uri, "Content already cached, not forcing");
            return Ok(false);
        }
        self.store(uri, content, content, true, Utc::now())?;
        Ok(true)
    }

    /// Store empty content for a URI that cannot be fetched
    ///
    /// Later `get` calls return the empty text instead of crawling again.
    /// Returns false if the URI is already cached.
    pub fn force_empty(&self, uri: &str) -> Result<bool> {
        if self.in_cache(uri)? {
            return Ok(false);
        }
        info!(uri, "Caching empty content for unfetchable URI");
        self.store(uri, "", "", false, Utc::now())?;
        Ok(true)
    }

    /// Mark a URI as used and refresh its last-accessed time. Idempotent.
    pub fn log_access(&self, uri: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE cache_entries SET accessed = 1, last_accessed = ?2 WHERE uri = ?1",
            params![uri, timestamp_to_sql(&Utc::now())],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("URI not cached: {}", uri)));
        }
        Ok(())
    }

    /// URIs not yet used by a consumer, in insertion order
    pub fn get_unaccessed_content(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uri FROM cache_entries WHERE accessed = 0 ORDER BY seq")?;
        let uris = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(uris)
    }

    /// Inject content not obtained by crawling
    ///
    /// Without a URI the key is the SHA-256 hex of the content. Existing
    /// content for the key is replaced and its `accessed` flag is reset,
    /// so content that was already consumed is queued for processing again.
    /// This is the only way an entry goes from accessed back to unaccessed.
    /// Returns the key used.
    pub fn add_content(&self, content: &str, uri: Option<&str>) -> Result<String> {
        let key = match uri {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            Some(_) => return Err(StoreError::Validation("URI cannot be empty".to_string())),
            None => sha256_hex(content),
        };
        self.store(&key, content, content, false, Utc::now())?;
        Ok(key)
    }

    /// Inject the contents of a text file
    pub fn add_content_from_file(&self, path: impl AsRef<Path>, uri: Option<&str>) -> Result<String> {
        let content = fs::read_to_string(path)?;
        self.add_content(&content, uri)
    }

    /// Number of cached URIs
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn store(&self, uri: &str, raw: &str, text: &str, accessed: bool, now: DateTime<Utc>) -> Result<()> {
        let uri_hash = sha256_hex(uri);
        fs::write(self.root.join(ORIGINAL_DIR).join(&uri_hash), raw)?;
        fs::write(self.root.join(PARSED_DIR).join(&uri_hash), text)?;

        // obtained_on is set once; re-stores only touch the access fields
        self.conn.execute(
            "INSERT INTO cache_entries (uri, uri_hash, obtained_on, last_accessed, accessed)
             VALUES (?1, ?2, ?3, ?3, ?4)
             ON CONFLICT(uri) DO UPDATE SET
                 last_accessed = excluded.last_accessed,
                 accessed = excluded.accessed",
            params![uri, uri_hash, timestamp_to_sql(&now), accessed],
        )?;
        Ok(())
    }
}

impl<C> ContentCache<C>
where
    C: Crawler,
    C::Error: Display,
{
    /// Cached text for `uri`, crawling and caching it on a miss
    ///
    /// A crawler failure is returned as [`StoreError::Fetch`] and leaves the
    /// cache untouched; callers may then use [`force_empty`](Self::force_empty).
    pub fn get(&self, uri: &str) -> Result<String> {
        if self.in_cache(uri)? {
            debug!(uri, "Cache hit");
            return self.read_cached(uri);
        }

        info!(uri, "Fetching");
        let fetched = self.crawler.fetch(uri).map_err(|e| StoreError::Fetch {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        self.store(uri, &fetched.raw, &fetched.text, false, Utc::now())?;
        Ok(fetched.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factrag_domain::FetchedContent;
    use tempfile::TempDir;

    struct EchoCrawler;

    impl Crawler for EchoCrawler {
        type Error = String;

        fn fetch(&self, uri: &str) -> std::result::Result<FetchedContent, String> {
            if uri.contains("broken") {
                return Err("connection refused".to_string());
            }
            Ok(FetchedContent {
                raw: format!("<p>{}</p>", uri),
                text: format!("text of {}", uri),
            })
        }
    }

    fn open_cache() -> (TempDir, ContentCache<EchoCrawler>) {
        let dir = TempDir::new().unwrap();
        let cache = ContentCache::open(dir.path(), EchoCrawler).unwrap();
        (dir, cache)
    }

    #[test]
    fn test_get_stores_both_blobs() {
        let (_dir, cache) = open_cache();
        let text = cache.get("https://a.example").unwrap();
        assert_eq!(text, "text of https://a.example");
        assert_eq!(cache.read_original("https://a.example").unwrap(), "<p>https://a.example</p>");

        let entry = cache.entry("https://a.example").unwrap().unwrap();
        assert!(!entry.accessed);
        assert_eq!(entry.uri_hash, ContentCache::<EchoCrawler>::uri_hash("https://a.example"));
    }

    #[test]
    fn test_fetch_error_leaves_cache_untouched() {
        let (_dir, cache) = open_cache();
        let result = cache.get("https://broken.example");
        assert!(matches!(result, Err(StoreError::Fetch { .. })));
        assert!(!cache.in_cache("https://broken.example").unwrap());
    }

    #[test]
    fn test_force_empty_prevents_refetch() {
        let (_dir, cache) = open_cache();
        assert!(cache.force_empty("https://broken.example").unwrap());
        assert_eq!(cache.get("https://broken.example").unwrap(), "");
        assert!(!cache.force_empty("https://broken.example").unwrap());
    }

    #[test]
    fn test_force_content_skip_if_present() {
        let (_dir, cache) = open_cache();
        assert!(cache.force_content("u1", "first", true).unwrap());
        assert!(!cache.force_content("u1", "second", true).unwrap());
        assert_eq!(cache.get("u1").unwrap(), "first");

        assert!(cache.force_content("u1", "third", false).unwrap());
        assert_eq!(cache.get("u1").unwrap(), "third");
        assert!(cache.entry("u1").unwrap().unwrap().accessed);
    }

    #[test]
    fn test_log_access_unknown_uri() {
        let (_dir, cache) = open_cache();
        assert!(matches!(cache.log_access("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_log_access_keeps_obtained_on() {
        let (_dir, cache) = open_cache();
        cache.get("https://a.example").unwrap();
        let before = cache.entry("https://a.example").unwrap().unwrap();
        cache.log_access("https://a.example").unwrap();
        cache.log_access("https://a.example").unwrap();
        let after = cache.entry("https://a.example").unwrap().unwrap();
        assert!(after.accessed);
        assert_eq!(after.obtained_on, before.obtained_on);
        assert!(after.last_accessed >= before.last_accessed);
    }

    #[test]
    fn test_add_content_derives_key_from_hash() {
        let (_dir, cache) = open_cache();
        let key = cache.add_content("abc", None).unwrap();
        assert_eq!(key, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        assert_eq!(cache.read_cached(&key).unwrap(), "abc");
        assert_eq!(cache.get_unaccessed_content().unwrap(), vec![key]);
    }

    #[test]
    fn test_add_content_from_file() {
        let (dir, cache) = open_cache();
        let path = dir.path().join("note.txt");
        fs::write(&path, "Copper stocks fell.").unwrap();
        let key = cache.add_content_from_file(&path, Some("file://note")).unwrap();
        assert_eq!(key, "file://note");
        assert_eq!(cache.get("file://note").unwrap(), "Copper stocks fell.");
    }

    #[test]
    fn test_add_content_rejects_empty_uri() {
        let (_dir, cache) = open_cache();
        assert!(matches!(cache.add_content("x", Some("")), Err(StoreError::Validation(_))));
    }
}
