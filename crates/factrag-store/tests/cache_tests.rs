//! Integration tests for the content cache
//!
//! These tests verify fetch deduplication and the access queue.

use factrag_domain::traits::Crawler;
use factrag_domain::FetchedContent;
use factrag_store::ContentCache;
use std::cell::Cell;
use tempfile::TempDir;

/// Crawler that counts how often it is called
struct CountingCrawler {
    calls: Cell<usize>,
}

impl CountingCrawler {
    fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Crawler for CountingCrawler {
    type Error = String;

    fn fetch(&self, uri: &str) -> Result<FetchedContent, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(FetchedContent {
            raw: format!("<html><body><p>{}</p></body></html>", uri),
            text: format!("Plain text for {} with ünïcödé", uri),
        })
    }
}

#[test]
fn test_get_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();

    assert!(!cache.in_cache("https://a.example/story").unwrap());
    let first = cache.get("https://a.example/story").unwrap();
    assert!(cache.in_cache("https://a.example/story").unwrap());
    let second = cache.get("https://a.example/story").unwrap();

    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(cache.crawler().calls.get(), 1);
}

#[test]
fn test_cache_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();
        cache.get("https://a.example").unwrap();
    }
    let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();
    assert!(cache.in_cache("https://a.example").unwrap());
    assert_eq!(cache.get("https://a.example").unwrap(), "Plain text for https://a.example with ünïcödé");
    assert_eq!(cache.crawler().calls.get(), 0);
}

#[test]
fn test_access_queue_drains() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();

    cache.get("https://a.example").unwrap();
    cache.get("https://b.example").unwrap();
    cache.add_content("Manually added note", Some("note://1")).unwrap();
    cache.force_content("https://forced.example", "forced", true).unwrap();

    let pending = cache.get_unaccessed_content().unwrap();
    assert_eq!(pending, vec!["https://a.example", "https://b.example", "note://1"]);

    for uri in &pending {
        cache.log_access(uri).unwrap();
    }
    assert!(cache.get_unaccessed_content().unwrap().is_empty());
    assert_eq!(cache.len().unwrap(), 4);
}

#[test]
fn test_new_content_requeues_after_drain() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();

    cache.get("https://a.example").unwrap();
    cache.log_access("https://a.example").unwrap();
    cache.get("https://c.example").unwrap();

    assert_eq!(cache.get_unaccessed_content().unwrap(), vec!["https://c.example"]);
}

#[test]
fn test_readding_content_requeues_consumed_entry() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::open(dir.path(), CountingCrawler::new()).unwrap();

    cache.add_content("first draft", Some("note://1")).unwrap();
    cache.log_access("note://1").unwrap();
    assert!(cache.get_unaccessed_content().unwrap().is_empty());

    cache.add_content("second draft", Some("note://1")).unwrap();
    assert_eq!(cache.get_unaccessed_content().unwrap(), vec!["note://1"]);
    assert_eq!(cache.get("note://1").unwrap(), "second draft");
    assert_eq!(cache.len().unwrap(), 1);
}
