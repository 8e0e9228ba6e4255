//! Search results returned by discovery adapters

/// One result from a web, news or feed search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Result location
    pub url: String,
    /// Result title (may be empty)
    pub title: String,
    /// Short description (may be empty)
    pub snippet: String,
}

impl SearchHit {
    /// A hit with only a URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            snippet: String::new(),
        }
    }
}
