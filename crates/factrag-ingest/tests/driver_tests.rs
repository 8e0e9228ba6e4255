//! Ingestion driver tests with in-memory collaborators

use factrag_domain::traits::{Crawler, FetchedContent, SourceDiscovery};
use factrag_domain::SearchHit;
use factrag_extractor::{FactExtractor, LineChunker};
use factrag_ingest::{IngestReport, IngestionDriver};
use factrag_store::embedding::MockEmbeddingModel;
use factrag_store::{ContentCache, FactStore, StoreConfig};
use std::cell::RefCell;
use std::collections::HashMap;
use tempfile::TempDir;

/// Serves fixed pages; anything else fails
struct PageCrawler {
    pages: HashMap<String, String>,
    fetched: RefCell<Vec<String>>,
}

impl PageCrawler {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(u, t)| (u.to_string(), t.to_string())).collect(),
            fetched: RefCell::new(Vec::new()),
        }
    }
}

impl Crawler for PageCrawler {
    type Error = String;

    fn fetch(&self, uri: &str) -> Result<FetchedContent, String> {
        self.fetched.borrow_mut().push(uri.to_string());
        self.pages
            .get(uri)
            .map(|text| FetchedContent {
                raw: format!("<p>{text}</p>"),
                text: text.clone(),
            })
            .ok_or_else(|| format!("404 for {uri}"))
    }
}

/// Returns canned hits per query; unknown queries fail
struct CannedDiscovery {
    results: HashMap<String, Vec<String>>,
}

impl SourceDiscovery for CannedDiscovery {
    type Error = String;

    fn discover(&self, query: &str) -> Result<Vec<SearchHit>, String> {
        self.results
            .get(query)
            .map(|urls| urls.iter().map(SearchHit::from_url).collect())
            .ok_or_else(|| format!("search failed for {query}"))
    }
}

type TestExtractor = FactExtractor<LineChunker, PageCrawler, MockEmbeddingModel>;

fn extractor(dir: &TempDir, crawler: PageCrawler) -> TestExtractor {
    let cache = ContentCache::open(dir.path().join("cache"), crawler).unwrap();
    let config = StoreConfig::with_root(dir.path().join("facts"));
    let store = FactStore::open(&config, MockEmbeddingModel::new(8)).unwrap();
    FactExtractor::new(cache, store, LineChunker::default())
}

fn pages() -> PageCrawler {
    PageCrawler::new(&[
        ("https://a.example", "Alpha fact number one\nAlpha fact number two"),
        ("https://b.example", "Beta fact is here"),
        ("https://blank.example", "tiny\n\n"),
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_failed_uri_does_not_abort_run() {
    let dir = TempDir::new().unwrap();
    let mut extractor = extractor(&dir, pages());

    let report = IngestionDriver::new().ingest_uris(
        &mut extractor,
        &strings(&["https://a.example", "https://missing.example", "https://b.example"]),
        "greek letters",
    );

    assert_eq!(report.discovered, 3);
    assert_eq!(report.extracted, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "https://missing.example");
    assert_eq!(extractor.store().count_facts(), 3);
}

#[test]
fn test_cached_uris_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut extractor = extractor(&dir, pages());
    let driver = IngestionDriver::new();
    let uris = strings(&["https://a.example", "https://blank.example"]);

    let first = driver.ingest_uris(&mut extractor, &uris, "topic");
    assert_eq!(first.extracted, 1);
    assert_eq!(first.empty, 1);

    let second = driver.ingest_uris(&mut extractor, &uris, "topic");
    assert_eq!(second.skipped_cached, 2);
    assert_eq!(second.extracted, 0);
    assert_eq!(extractor.cache().crawler().fetched.borrow().len(), 2);
    assert_eq!(extractor.store().count_facts(), 2);
}

#[test]
fn test_failed_query_is_recorded_and_skipped() {
    let dir = TempDir::new().unwrap();
    let mut extractor = extractor(&dir, pages());
    let discovery = CannedDiscovery {
        results: HashMap::from([
            ("alpha".to_string(), strings(&["https://a.example"])),
            ("both".to_string(), strings(&["https://a.example", "https://b.example"])),
        ]),
    };

    let report = IngestionDriver::new().run(
        &mut extractor,
        &discovery,
        &strings(&["alpha", "broken", "both"]),
        "topic",
    );

    assert_eq!(report.failed_queries.len(), 1);
    assert_eq!(report.failed_queries[0].0, "broken");
    // a.example appears twice across queries but is considered once
    assert_eq!(report.discovered, 2);
    assert_eq!(report.extracted, 2);
    assert!(report.failed.is_empty());
}

#[test]
fn test_force_empty_on_fetch_error() {
    let dir = TempDir::new().unwrap();
    let mut extractor = extractor(&dir, pages());
    let uris = strings(&["https://missing.example"]);

    let lenient = IngestionDriver::new();
    lenient.ingest_uris(&mut extractor, &uris, "topic");
    assert!(!extractor.cache().in_cache("https://missing.example").unwrap());

    let forcing = IngestionDriver::new().with_force_empty_on_fetch_error(true);
    let report = forcing.ingest_uris(&mut extractor, &uris, "topic");
    assert_eq!(report.failed.len(), 1);
    assert!(extractor.cache().in_cache("https://missing.example").unwrap());

    let again = forcing.ingest_uris(&mut extractor, &uris, "topic");
    assert_eq!(again.skipped_cached, 1);
    assert_eq!(extractor.cache().crawler().fetched.borrow().len(), 2);
}

#[test]
fn test_report_merge_and_display() {
    let mut total = IngestReport {
        discovered: 2,
        extracted: 1,
        empty: 1,
        ..IngestReport::default()
    };
    total.merge(IngestReport {
        discovered: 1,
        failed: vec![("u".to_string(), "e".to_string())],
        ..IngestReport::default()
    });
    assert_eq!(total.discovered, 3);
    assert_eq!(
        total.to_string(),
        "3 discovered, 0 already cached, 1 with facts, 1 without facts, 1 failed"
    );
}
