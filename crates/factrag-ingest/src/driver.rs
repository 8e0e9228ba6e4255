//! Ingestion driver: discovery → cache → extraction

use factrag_domain::traits::{Chunker, Crawler, EmbeddingModel, SourceDiscovery};
use factrag_extractor::FactExtractor;
use std::collections::HashSet;
use std::fmt::{self, Display};
use tracing::{error, info, warn};

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Distinct URIs considered
    pub discovered: usize,
    /// URIs skipped because the cache already held them
    pub skipped_cached: usize,
    /// URIs that produced at least one fact
    pub extracted: usize,
    /// URIs processed without producing facts
    pub empty: usize,
    /// URIs that failed, with the error message
    pub failed: Vec<(String, String)>,
    /// Discovery queries that failed, with the error message
    pub failed_queries: Vec<(String, String)>,
}

impl IngestReport {
    /// Fold another report into this one
    pub fn merge(&mut self, other: IngestReport) {
        self.discovered += other.discovered;
        self.skipped_cached += other.skipped_cached;
        self.extracted += other.extracted;
        self.empty += other.empty;
        self.failed.extend(other.failed);
        self.failed_queries.extend(other.failed_queries);
    }
}

impl Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} already cached, {} with facts, {} without facts, {} failed",
            self.discovered,
            self.skipped_cached,
            self.extracted,
            self.empty,
            self.failed.len() + self.failed_queries.len()
        )
    }
}

/// Routes discovered URIs through a [`FactExtractor`]
///
/// Failures are per item: a failing query or URI is logged, recorded in the
/// report, and the run moves on.
#[derive(Debug, Clone, Default)]
pub struct IngestionDriver {
    force_empty_on_fetch_error: bool,
}

impl IngestionDriver {
    /// Create a driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache an empty entry for URIs that cannot be fetched, so later runs
    /// skip them
    pub fn with_force_empty_on_fetch_error(mut self, enabled: bool) -> Self {
        self.force_empty_on_fetch_error = enabled;
        self
    }

    /// Run every query through `discovery` and ingest the resulting URIs
    pub fn run<D, K, C, E>(
        &self,
        extractor: &mut FactExtractor<K, C, E>,
        discovery: &D,
        queries: &[String],
        topic: &str,
    ) -> IngestReport
    where
        D: SourceDiscovery,
        D::Error: Display,
        K: Chunker,
        K::Error: Display,
        C: Crawler,
        C::Error: Display,
        E: EmbeddingModel,
        E::Error: Display,
    {
        let mut report = IngestReport::default();
        let mut seen = HashSet::new();

        for query in queries {
            let hits = match discovery.discover(query) {
                Ok(hits) => hits,
                Err(e) => {
                    error!(query = %query, error = %e, "Discovery failed, skipping query");
                    report.failed_queries.push((query.clone(), e.to_string()));
                    continue;
                }
            };
            info!(query = %query, hits = hits.len(), "Discovered sources");

            for hit in hits {
                if seen.insert(hit.url.clone()) {
                    self.ingest_one(extractor, &hit.url, topic, &mut report);
                }
            }
        }

        info!(%report, "Ingestion finished");
        report
    }

    /// Ingest an explicit list of URIs
    pub fn ingest_uris<K, C, E>(
        &self,
        extractor: &mut FactExtractor<K, C, E>,
        uris: &[String],
        topic: &str,
    ) -> IngestReport
    where
        K: Chunker,
        K::Error: Display,
        C: Crawler,
        C::Error: Display,
        E: EmbeddingModel,
        E::Error: Display,
    {
        let mut report = IngestReport::default();
        let mut seen = HashSet::new();
        for uri in uris {
            if seen.insert(uri.as_str()) {
                self.ingest_one(extractor, uri, topic, &mut report);
            }
        }
        info!(%report, "Ingestion finished");
        report
    }

    fn ingest_one<K, C, E>(
        &self,
        extractor: &mut FactExtractor<K, C, E>,
        uri: &str,
        topic: &str,
        report: &mut IngestReport,
    ) where
        K: Chunker,
        K::Error: Display,
        C: Crawler,
        C::Error: Display,
        E: EmbeddingModel,
        E::Error: Display,
    {
        report.discovered += 1;

        match extractor.cache().in_cache(uri) {
            Ok(true) => {
                info!(uri, "Already cached, skipping");
                report.skipped_cached += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                error!(uri, error = %e, "Cache lookup failed");
                report.failed.push((uri.to_string(), e.to_string()));
                return;
            }
        }

        match extractor.facts_from_url(uri, topic) {
            Ok(true) => report.extracted += 1,
            Ok(false) => report.empty += 1,
            Err(e) => {
                warn!(uri, error = %e, "Ingestion failed");
                if e.is_fetch_error() && self.force_empty_on_fetch_error {
                    if let Err(cache_err) = extractor.cache().force_empty(uri) {
                        error!(uri, error = %cache_err, "Could not cache empty entry");
                    }
                }
                report.failed.push((uri.to_string(), e.to_string()));
            }
        }
    }
}
