//! Fact module - the unit of knowledge in the fact store

use chrono::{DateTime, Utc};
use std::fmt;

/// Sequential identifier of a fact
///
/// IDs are assigned by the fact store in insertion order, starting at 0,
/// and are never reused. The canonical rendering is `f<n>` (e.g. `f12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactId(u64);

impl FactId {
    /// Create a FactId from its sequence number
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw sequence number
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The sequence number as an index into the store
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Parse a FactId from a citation token
    ///
    /// Accepts `f12`, `F12` and the legacy bare form `12`. Surrounding
    /// whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use factrag_domain::FactId;
    ///
    /// assert_eq!(FactId::parse("f12").unwrap().value(), 12);
    /// assert_eq!(FactId::parse(" F3 ").unwrap().value(), 3);
    /// assert_eq!(FactId::parse("7").unwrap().value(), 7);
    /// assert!(FactId::parse("fx").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, String> {
        let lowered = token.trim().to_lowercase();
        let digits = lowered.strip_prefix('f').unwrap_or(&lowered);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| format!("Invalid fact ID: {:?}", token))
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// A fact - an atomic, sourced claim extracted from content
///
/// Facts are immutable once stored; the store is append-only.
/// The embedding of a fact lives in the vector index, keyed by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    /// Unique sequential identifier
    pub id: FactId,

    /// The fact text
    pub content: String,

    /// Provenance URI
    pub source: String,

    /// When the fact was added to the store
    pub added_at: DateTime<Utc>,
}

impl Fact {
    /// Create a new fact, validating required fields
    ///
    /// Content must contain non-whitespace text and the source must be a
    /// non-empty URI.
    pub fn new(
        id: FactId,
        content: impl Into<String>,
        source: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        let content = content.into();
        let source = source.into();
        validate_fact_fields(&content, &source)?;
        Ok(Self {
            id,
            content,
            source,
            added_at,
        })
    }

    /// Added time as fractional seconds since the Unix epoch
    pub fn added_at_epoch(&self) -> f64 {
        to_epoch_seconds(&self.added_at)
    }

    /// Added time rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn added_label(&self) -> String {
        self.added_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Check the fields a fact must carry, before an ID is assigned
pub fn validate_fact_fields(content: &str, source: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Fact content cannot be empty".to_string());
    }
    if source.trim().is_empty() {
        return Err("Fact source cannot be empty".to_string());
    }
    Ok(())
}

/// Convert a timestamp to fractional seconds since the Unix epoch
pub fn to_epoch_seconds(at: &DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fact_id_display() {
        assert_eq!(FactId::new(0).to_string(), "f0");
        assert_eq!(FactId::new(42).to_string(), "f42");
    }

    #[test]
    fn test_fact_id_parse_variants() {
        assert_eq!(FactId::parse("f1").unwrap(), FactId::new(1));
        assert_eq!(FactId::parse("F1").unwrap(), FactId::new(1));
        assert_eq!(FactId::parse("1").unwrap(), FactId::new(1));
        assert_eq!(FactId::parse("  f10\n").unwrap(), FactId::new(10));
    }

    #[test]
    fn test_fact_id_parse_invalid() {
        assert!(FactId::parse("").is_err());
        assert!(FactId::parse("f").is_err());
        assert!(FactId::parse("ff1").is_err());
        assert!(FactId::parse("f1 2").is_err());
        assert!(FactId::parse("f-1").is_err());
    }

    #[test]
    fn test_fact_id_ordering() {
        assert!(FactId::new(1) < FactId::new(2));
    }

    #[test]
    fn test_fact_new_validates() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(Fact::new(FactId::new(0), "Wheat rose 3%.", "https://a.example", at).is_ok());
        assert!(Fact::new(FactId::new(0), "   ", "https://a.example", at).is_err());
        assert!(Fact::new(FactId::new(0), "Wheat rose 3%.", "", at).is_err());
    }

    #[test]
    fn test_fact_time_rendering() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let fact = Fact::new(FactId::new(3), "x fact", "https://a.example", at).unwrap();
        assert_eq!(fact.added_label(), "2024-03-01 12:30:05");
        assert_eq!(fact.added_at_epoch(), at.timestamp() as f64);
    }
}
