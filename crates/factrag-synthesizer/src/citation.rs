//! Citation resolution: `[f12]` fact references to numbered footnotes

use crate::error::SynthError;
use factrag_domain::traits::FactLookup;
use factrag_domain::FactId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Write};
use tracing::debug;

/// Bracketed, comma-separated fact references, e.g. `[f1]` or `[f3, f7]`
const REFERENCE_PATTERN: &str = r"(?i)\[f[\d\s,f]+\]";

/// Header placed before plain-text end notes
const PLAIN_NOTES_HEADER: &str = "\n\nSources:\n";

/// How resolved citations are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// `[1, 2]` in the text, `n :: <uri>` end notes
    #[default]
    Plain,
    /// Source-link anchors in the text, one `<span>` per fact in the notes
    Html,
}

/// One footnote: a fact and the number it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Display number
    pub number: u64,
    /// The cited fact
    pub fact_id: FactId,
    /// Fact source URI
    pub source: String,
    /// Fact text
    pub content: String,
}

/// Result of resolving a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Text with references replaced
    pub text: String,
    /// End notes, one per cited fact in numbering order
    pub notes: String,
    /// Last number assigned; pass it as `start_count` to continue numbering
    pub next_count: u64,
    /// Footnotes in numbering order
    pub citations: Vec<Citation>,
}

impl Resolved {
    /// Whether any reference was found
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }

    /// Text followed by its end notes
    ///
    /// Plain notes go under a `Sources:` header. Without citations the text
    /// is returned as is.
    pub fn document(&self, style: CitationStyle) -> String {
        if !self.has_citations() {
            return self.text.clone();
        }
        match style {
            CitationStyle::Plain => format!("{}{}{}", self.text, PLAIN_NOTES_HEADER, self.notes),
            CitationStyle::Html => format!("{}\n\n{}", self.text, self.notes),
        }
    }
}

/// Rewrites inline fact references into numbered, source-linked citations
///
/// Each distinct fact gets one number for the whole document; repeated
/// references reuse it. Numbering starts after `start_count`.
#[derive(Debug, Clone)]
pub struct CitationResolver {
    style: CitationStyle,
    pattern: Regex,
}

impl CitationResolver {
    /// Create a resolver for the given style
    pub fn new(style: CitationStyle) -> Result<Self, SynthError> {
        Ok(Self {
            style,
            pattern: Regex::new(REFERENCE_PATTERN)?,
        })
    }

    /// Plain-text resolver
    pub fn plain() -> Result<Self, SynthError> {
        Self::new(CitationStyle::Plain)
    }

    /// HTML resolver
    pub fn html() -> Result<Self, SynthError> {
        Self::new(CitationStyle::Html)
    }

    /// Output style
    pub fn style(&self) -> CitationStyle {
        self.style
    }

    /// Resolve every reference in `text`
    ///
    /// Fails with [`SynthError::NotFound`] if any reference names a fact the
    /// lookup does not have; no partial result is returned.
    pub fn resolve<L>(&self, text: &str, lookup: &L, start_count: u64) -> Result<Resolved, SynthError>
    where
        L: FactLookup + ?Sized,
        L::Error: Display,
    {
        let mut out = String::with_capacity(text.len());
        let mut notes = String::new();
        let mut citations: Vec<Citation> = Vec::new();
        let mut assigned: HashMap<FactId, usize> = HashMap::new();
        let mut counter = start_count;
        let mut last = 0;

        for m in self.pattern.find_iter(text) {
            out.push_str(&text[last..m.start()]);

            let inner = &m.as_str()[1..m.as_str().len() - 1];
            let mut in_bracket: Vec<usize> = Vec::new();

            for token in inner.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
                let id = FactId::parse(token)
                    .map_err(|_| SynthError::NotFound(format!("invalid fact reference {:?}", token)))?;

                let slot = match assigned.get(&id) {
                    Some(&slot) => slot,
                    None => {
                        let fact = lookup
                            .lookup_fact(id)
                            .map_err(|e| SynthError::Lookup(e.to_string()))?
                            .ok_or_else(|| SynthError::NotFound(format!("fact {}", id)))?;
                        counter += 1;
                        let citation = Citation {
                            number: counter,
                            fact_id: id,
                            source: fact.source,
                            content: fact.content,
                        };
                        self.write_note(&mut notes, &citation);
                        citations.push(citation);
                        assigned.insert(id, citations.len() - 1);
                        citations.len() - 1
                    }
                };
                if !in_bracket.contains(&slot) {
                    in_bracket.push(slot);
                }
            }

            self.write_reference(&mut out, in_bracket.iter().map(|&slot| &citations[slot]));
            last = m.end();
        }

        if citations.is_empty() {
            return Ok(Resolved {
                text: text.to_string(),
                notes: String::new(),
                next_count: start_count,
                citations,
            });
        }

        out.push_str(&text[last..]);
        debug!(citations = citations.len(), next_count = counter, "Resolved citations");

        Ok(Resolved {
            text: out,
            notes,
            next_count: counter,
            citations,
        })
    }

    /// Resolve from 0 and join text and end notes into one document
    ///
    /// Text without references comes back unchanged.
    pub fn resolve_text<L>(&self, text: &str, lookup: &L) -> Result<String, SynthError>
    where
        L: FactLookup + ?Sized,
        L::Error: Display,
    {
        Ok(self.resolve(text, lookup, 0)?.document(self.style))
    }

    fn write_reference<'a>(&self, out: &mut String, citations: impl Iterator<Item = &'a Citation>) {
        match self.style {
            CitationStyle::Plain => {
                let numbers: Vec<String> = citations.map(|c| c.number.to_string()).collect();
                let _ = write!(out, "[{}]", numbers.join(", "));
            }
            CitationStyle::Html => {
                let anchors: Vec<String> = citations
                    .map(|c| {
                        format!(
                            "<a class='source_link' target='_blank' href='{}'>{}</a>",
                            escape_html(&c.source),
                            c.number
                        )
                    })
                    .collect();
                out.push_str(&anchors.join(" "));
            }
        }
    }

    fn write_note(&self, notes: &mut String, citation: &Citation) {
        let _ = match self.style {
            CitationStyle::Plain => writeln!(notes, "{} :: {}", citation.number, citation.source),
            CitationStyle::Html => writeln!(
                notes,
                "<span class='fact_span'><b>{}:</b> {} <a href='{}' target='_blank'>View Source</a></span>",
                citation.number,
                escape_html(&citation.content),
                escape_html(&citation.source)
            ),
        };
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
