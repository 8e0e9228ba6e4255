//! HTTP crawler with HTML-to-text extraction

use crate::config::IngestConfig;
use crate::error::IngestError;
use factrag_domain::traits::{Crawler, FetchedContent};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Elements whose text is kept as a paragraph
const TEXT_ELEMENTS: &[&str] = &["p", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "span"];

/// Elements never descended into
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A text element must have more words than this to be kept
const MIN_WORDS: usize = 7;

/// Extract readable text from an HTML document
///
/// Walks the body, keeping the full text of paragraph-like elements with
/// more than seven words. Kept blocks are separated by a blank line.
/// Bare text outside those elements (navigation, labels) is dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    collect_text(body, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            continue;
        }
        if TEXT_ELEMENTS.contains(&name) {
            let text = child.text().collect::<String>();
            if text.trim().split(' ').count() > MIN_WORDS {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        } else {
            collect_text(child, out);
        }
    }
}

/// Blocking HTTP crawler
#[derive(Debug, Clone)]
pub struct HttpCrawler {
    client: Client,
}

impl HttpCrawler {
    /// Create a crawler from configuration
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        Ok(Self {
            client: crate::http_client(config)?,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Crawler for HttpCrawler {
    type Error = IngestError;

    #[instrument(skip(self))]
    fn fetch(&self, uri: &str) -> Result<FetchedContent, Self::Error> {
        let response = self.client.get(uri).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
                url: uri.to_string(),
            });
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_none_or(|value| value.to_ascii_lowercase().contains("html"));

        let raw = response.text()?;
        let text = if is_html { html_to_text(&raw) } else { raw.clone() };
        debug!(uri, raw_len = raw.len(), text_len = text.len(), is_html, "Fetched");
        Ok(FetchedContent { raw, text })
    }
}
