//! Source discovery: web search, news search and RSS/Atom feeds

use crate::config::IngestConfig;
use crate::error::IngestError;
use factrag_domain::traits::SourceDiscovery;
use factrag_domain::SearchHit;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Google Custom Search JSON API endpoint
pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// NewsAPI archive search endpoint
pub const NEWSAPI_EVERYTHING_ENDPOINT: &str = "https://newsapi.org/v2/everything";

/// NewsAPI top headlines endpoint
pub const NEWSAPI_HEADLINES_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

fn require_key(name: &str, value: &str) -> Result<(), IngestError> {
    if value.trim().is_empty() {
        return Err(IngestError::Config(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Read a response body, turning non-success statuses into errors
///
/// `api_message` pulls a service-specific error message out of an error body.
fn read_body(
    response: Response,
    url: &str,
    api_message: fn(&str) -> Option<String>,
) -> Result<String, IngestError> {
    let status = response.status();
    let body = response.text()?;
    if status.is_success() {
        return Ok(body);
    }
    match api_message(&body) {
        Some(message) => Err(IngestError::Api(message)),
        None => Err(IngestError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}

// ---- Google Custom Search ----

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    error: Option<GoogleError>,
}

#[derive(Deserialize)]
struct GoogleItem {
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

/// Parse a Google Custom Search response body
///
/// A response without `items` means no results.
pub fn parse_google_results(body: &str) -> Result<Vec<SearchHit>, IngestError> {
    let parsed: GoogleResponse =
        serde_json::from_str(body).map_err(|e| IngestError::InvalidResponse(e.to_string()))?;
    if let Some(error) = parsed.error {
        return Err(IngestError::Api(error.message));
    }
    Ok(parsed
        .items
        .into_iter()
        .map(|item| SearchHit {
            url: item.link,
            title: item.title,
            snippet: item.snippet,
        })
        .collect())
}

fn google_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<GoogleResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map(|e| e.message)
}

/// Web search through the Google Custom Search JSON API
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    client: Client,
    api_key: String,
    search_id: String,
    num: usize,
}

impl GoogleSearch {
    /// Create a search adapter
    pub fn new(api_key: impl Into<String>, search_id: impl Into<String>, config: &IngestConfig) -> Result<Self, IngestError> {
        let api_key = api_key.into();
        let search_id = search_id.into();
        require_key("Google API key", &api_key)?;
        require_key("Google search engine ID", &search_id)?;
        Ok(Self {
            client: crate::http_client(config)?,
            api_key,
            search_id,
            num: config.results_per_query,
        })
    }
}

impl SourceDiscovery for GoogleSearch {
    type Error = IngestError;

    #[instrument(skip(self))]
    fn discover(&self, query: &str) -> Result<Vec<SearchHit>, Self::Error> {
        let num = self.num.to_string();
        let response = self
            .client
            .get(GOOGLE_SEARCH_ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.search_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()?;
        let body = read_body(response, GOOGLE_SEARCH_ENDPOINT, google_error_message)?;
        let hits = parse_google_results(&body)?;
        debug!(query, hits = hits.len(), "Google search");
        Ok(hits)
    }
}

// ---- NewsAPI ----

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Deserialize)]
struct NewsArticle {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

/// Parse a NewsAPI response body
///
/// Articles without a URL are skipped.
pub fn parse_news_results(body: &str) -> Result<Vec<SearchHit>, IngestError> {
    let parsed: NewsResponse =
        serde_json::from_str(body).map_err(|e| IngestError::InvalidResponse(e.to_string()))?;
    if parsed.status == "error" {
        return Err(IngestError::Api(parsed.message.unwrap_or_default()));
    }
    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|article| {
            let url = article.url.filter(|u| !u.trim().is_empty())?;
            Some(SearchHit {
                url,
                title: article.title.unwrap_or_default(),
                snippet: article.description.unwrap_or_default(),
            })
        })
        .collect())
}

fn news_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<NewsResponse>(body)
        .ok()
        .filter(|r| r.status == "error")
        .and_then(|r| r.message)
}

/// News search through NewsAPI
#[derive(Debug, Clone)]
pub struct NewsApi {
    client: Client,
    api_key: String,
    top_headlines: bool,
}

impl NewsApi {
    /// Create a news adapter; `top_headlines` comes from the config
    pub fn new(api_key: impl Into<String>, config: &IngestConfig) -> Result<Self, IngestError> {
        let api_key = api_key.into();
        require_key("NewsAPI key", &api_key)?;
        Ok(Self {
            client: crate::http_client(config)?,
            api_key,
            top_headlines: config.top_headlines,
        })
    }

    fn endpoint(&self) -> &'static str {
        if self.top_headlines {
            NEWSAPI_HEADLINES_ENDPOINT
        } else {
            NEWSAPI_EVERYTHING_ENDPOINT
        }
    }
}

impl SourceDiscovery for NewsApi {
    type Error = IngestError;

    #[instrument(skip(self))]
    fn discover(&self, query: &str) -> Result<Vec<SearchHit>, Self::Error> {
        let endpoint = self.endpoint();
        let response = self
            .client
            .get(endpoint)
            .query(&[("q", query), ("apiKey", self.api_key.as_str())])
            .send()?;
        let body = read_body(response, endpoint, news_error_message)?;
        let hits = parse_news_results(&body)?;
        debug!(query, hits = hits.len(), "News search");
        Ok(hits)
    }
}

// ---- RSS / Atom ----

struct FeedPatterns {
    item: Regex,
    entry: Regex,
    title: Regex,
    link_text: Regex,
    link_href: Regex,
    summary: Regex,
    cdata: Regex,
}

impl FeedPatterns {
    fn new() -> Result<Self, IngestError> {
        Ok(Self {
            item: Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>")?,
            entry: Regex::new(r"(?is)<entry\b[^>]*>(.*?)</entry>")?,
            title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>")?,
            link_text: Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>")?,
            link_href: Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)?,
            summary: Regex::new(r"(?is)<(description|summary)\b[^>]*>(.*?)</(?:description|summary)>")?,
            cdata: Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>")?,
        })
    }

    fn decode(&self, raw: &str) -> String {
        let stripped = self.cdata.replace_all(raw, "$1");
        let unescaped = stripped
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&amp;", "&");
        unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn capture(&self, re: &Regex, block: &str, group: usize) -> Option<String> {
        re.captures(block)
            .and_then(|c| c.get(group))
            .map(|m| self.decode(m.as_str()))
            .filter(|s| !s.is_empty())
    }

    fn hit_from_block(&self, block: &str) -> Option<SearchHit> {
        let url = self
            .capture(&self.link_text, block, 1)
            .or_else(|| self.capture(&self.link_href, block, 1))?;
        Some(SearchHit {
            url,
            title: self.capture(&self.title, block, 1).unwrap_or_default(),
            snippet: self.capture(&self.summary, block, 2).unwrap_or_default(),
        })
    }
}

/// Extract item links from an RSS 2.0 or Atom document
///
/// Duplicate links are dropped and at most `limit` hits are returned, in
/// document order.
pub fn parse_feed_links(xml: &str, limit: usize) -> Result<Vec<SearchHit>, IngestError> {
    let patterns = FeedPatterns::new()?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let blocks = patterns
        .item
        .captures_iter(xml)
        .chain(patterns.entry.captures_iter(xml))
        .filter_map(|c| c.get(1).map(|m| m.as_str()));

    for block in blocks {
        if out.len() >= limit {
            break;
        }
        let Some(hit) = patterns.hit_from_block(block) else {
            continue;
        };
        if seen.insert(hit.url.clone()) {
            out.push(hit);
        }
    }
    Ok(out)
}

/// RSS/Atom feed reader; the discovery query is the feed URL
#[derive(Debug, Clone)]
pub struct RssFeed {
    client: Client,
    limit: usize,
}

impl RssFeed {
    /// Create a feed reader
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        Ok(Self {
            client: crate::http_client(config)?,
            limit: config.feed_item_limit,
        })
    }
}

impl SourceDiscovery for RssFeed {
    type Error = IngestError;

    #[instrument(skip(self))]
    fn discover(&self, feed_url: &str) -> Result<Vec<SearchHit>, Self::Error> {
        let response = self.client.get(feed_url).send()?;
        let body = read_body(response, feed_url, |_| None)?;
        let hits = parse_feed_links(&body, self.limit)?;
        debug!(feed_url, hits = hits.len(), "Feed read");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_results() {
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"link": "https://a.example/1", "title": "One", "snippet": "first"},
                {"link": "https://b.example/2"}
            ]
        }"#;
        let hits = parse_google_results(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.example/1");
        assert_eq!(hits[0].snippet, "first");
        assert_eq!(hits[1].title, "");
    }

    #[test]
    fn test_google_no_items_is_empty() {
        let hits = parse_google_results(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_google_error_body() {
        let body = r#"{"error": {"code": 403, "message": "quota exceeded"}}"#;
        match parse_google_results(body) {
            Err(IngestError::Api(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(google_error_message(body).as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_google_garbage_is_invalid_response() {
        assert!(matches!(
            parse_google_results("<html>"),
            Err(IngestError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_news_results_skip_missing_urls() {
        let body = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"url": "https://news.example/a", "title": "A", "description": null},
                {"url": null, "title": "B"},
                {"url": "https://news.example/c", "title": null, "description": "C desc"}
            ]
        }"#;
        let hits = parse_news_results(body).unwrap();
        let urls: Vec<_> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["https://news.example/a", "https://news.example/c"]);
        assert_eq!(hits[1].snippet, "C desc");
    }

    #[test]
    fn test_news_error_status() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "bad key"}"#;
        assert!(matches!(parse_news_results(body), Err(IngestError::Api(m)) if m == "bad key"));
        assert_eq!(news_error_message(body).as_deref(), Some("bad key"));
    }

    #[test]
    fn test_rss_items() {
        let xml = r#"<?xml version="1.0"?>
            <rss><channel><title>Feed</title><link>https://feed.example/</link>
            <item>
                <title><![CDATA[First &amp; best]]></title>
                <link>https://feed.example/1</link>
                <description>Some   description</description>
            </item>
            <item><title>Second</title><link> https://feed.example/2 </link></item>
            <item><title>Dup</title><link>https://feed.example/1</link></item>
            <item><title>No link</title></item>
            </channel></rss>"#;
        let hits = parse_feed_links(xml, 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://feed.example/1");
        assert_eq!(hits[0].title, "First & best");
        assert_eq!(hits[0].snippet, "Some description");
        assert_eq!(hits[1].url, "https://feed.example/2");
    }

    #[test]
    fn test_atom_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <link href="https://atom.example/"/>
            <entry><title>E1</title><link rel="alternate" href="https://atom.example/e1"/>
                <summary>entry summary</summary></entry>
            <entry><title>E2</title><link href='https://atom.example/e2?a=1&amp;b=2'/></entry>
            </feed>"#;
        let hits = parse_feed_links(xml, 10).unwrap();
        let urls: Vec<_> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["https://atom.example/e1", "https://atom.example/e2?a=1&b=2"]);
        assert_eq!(hits[0].snippet, "entry summary");
    }

    #[test]
    fn test_feed_limit() {
        let items: String = (0..5)
            .map(|i| format!("<item><link>https://l.example/{i}</link></item>"))
            .collect();
        let hits = parse_feed_links(&format!("<rss>{items}</rss>"), 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[2].url, "https://l.example/2");
    }

    #[test]
    fn test_empty_keys_rejected() {
        let config = IngestConfig::default();
        assert!(matches!(GoogleSearch::new("", "cx", &config), Err(IngestError::Config(_))));
        assert!(matches!(NewsApi::new("  ", &config), Err(IngestError::Config(_))));
    }
}
