//! Ingest command implementation.

use crate::cli::IngestSource;
use crate::config::Config;
use crate::context;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use factrag_ingest::{GoogleSearch, IngestionDriver, NewsApi, RssFeed};
use std::fs;
use tracing::info;

/// Execute the ingest command.
pub fn execute_ingest(source: IngestSource, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut extractor = context::open_extractor(config)?;
    let driver = IngestionDriver::new().with_force_empty_on_fetch_error(config.ingest.force_empty_on_fetch_error);

    let report = match source {
        IngestSource::Url { urls, topic } => driver.ingest_uris(&mut extractor, &urls, &topic.topic),
        IngestSource::Search {
            queries,
            topic,
            google_api_key,
            google_search_id,
        } => {
            let api_key = credential(google_api_key, &config.search.google_api_key, "GOOGLE_API_KEY")?;
            let search_id = credential(google_search_id, &config.search.google_search_id, "GOOGLE_SEARCH_ID")?;
            let search = GoogleSearch::new(api_key, search_id, &config.ingest)?;
            driver.run(&mut extractor, &search, &queries, &topic.topic)
        }
        IngestSource::News {
            queries,
            topic,
            newsapi_key,
            top_headlines,
        } => {
            let api_key = credential(newsapi_key, &config.search.newsapi_key, "NEWSAPI_KEY")?;
            let mut ingest = config.ingest.clone();
            ingest.top_headlines |= top_headlines;
            let news = NewsApi::new(api_key, &ingest)?;
            driver.run(&mut extractor, &news, &queries, &topic.topic)
        }
        IngestSource::Rss { feeds, topic } => {
            let feed = RssFeed::new(&config.ingest)?;
            driver.run(&mut extractor, &feed, &feeds, &topic.topic)
        }
        IngestSource::Content { uri, file, topic } => {
            let content = fs::read_to_string(&file)?;
            let added = extractor.facts_from_content(&uri, &content, &topic.topic)?;
            info!(uri = %uri, added, "Content ingested");
            let message = if added {
                formatter.success(&format!("Facts extracted from {}", uri))
            } else {
                formatter.warning(&format!("No new facts from {} (already cached or nothing found)", uri))
            };
            println!("{}", message);
            return Ok(());
        }
    };

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Pick the flag/env value, falling back to the config file.
fn credential(flag: Option<String>, configured: &Option<String>, name: &str) -> Result<String> {
    flag.or_else(|| configured.clone())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CliError::Config(format!("{} is not set (flag, environment or [search] table)", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_config() {
        let key = credential(Some("flag".into()), &Some("file".into()), "K").unwrap();
        assert_eq!(key, "flag");
    }

    #[test]
    fn test_config_fallback() {
        let key = credential(None, &Some("file".into()), "K").unwrap();
        assert_eq!(key, "file");
    }

    #[test]
    fn test_missing_credential() {
        assert!(matches!(credential(None, &None, "K"), Err(CliError::Config(_))));
        assert!(credential(Some("  ".into()), &None, "K").is_err());
    }
}
