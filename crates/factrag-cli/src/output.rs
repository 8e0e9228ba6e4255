//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use factrag_domain::Fact;
use factrag_ingest::IngestReport;
use factrag_store::RetrievedFact;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest fact text shown in a table cell.
const MAX_CELL_CHARS: usize = 80;

/// One displayable fact, with a distance when it came from a query.
struct FactRow<'a> {
    id: String,
    added: String,
    source: &'a str,
    content: &'a str,
    distance: Option<f32>,
}

impl<'a> From<&'a RetrievedFact> for FactRow<'a> {
    fn from(fact: &'a RetrievedFact) -> Self {
        Self {
            id: fact.id.to_string(),
            added: fact.added.clone(),
            source: &fact.source,
            content: &fact.content,
            distance: Some(fact.distance),
        }
    }
}

impl<'a> From<&'a Fact> for FactRow<'a> {
    fn from(fact: &'a Fact) -> Self {
        Self {
            id: fact.id.to_string(),
            added: fact.added_label(),
            source: &fact.source,
            content: &fact.content,
            distance: None,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format query results, closest first.
    pub fn format_retrieved(&self, facts: &[RetrievedFact]) -> Result<String> {
        self.format_rows(facts.iter().map(FactRow::from).collect())
    }

    /// Format stored facts.
    pub fn format_facts<'a>(&self, facts: impl IntoIterator<Item = &'a Fact>) -> Result<String> {
        self.format_rows(facts.into_iter().map(FactRow::from).collect())
    }

    fn format_rows(&self, rows: Vec<FactRow<'_>>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        let mut value = serde_json::json!({
                            "id": row.id,
                            "content": row.content,
                            "source": row.source,
                            "added": row.added,
                        });
                        if let Some(distance) = row.distance {
                            value["distance"] = serde_json::json!(distance);
                        }
                        value
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(rows.iter().map(|row| row.id.as_str()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No facts found.", "yellow"));
                }

                let with_distance = rows.iter().any(|row| row.distance.is_some());
                let mut builder = Builder::default();
                let mut header = vec!["ID", "Added", "Source", "Fact"];
                if with_distance {
                    header.push("Distance");
                }
                builder.push_record(header);

                for row in &rows {
                    let mut record = vec![
                        row.id.clone(),
                        row.added.clone(),
                        row.source.to_string(),
                        truncate(row.content, MAX_CELL_CHARS),
                    ];
                    if let Some(distance) = row.distance {
                        record.push(format!("{:.4}", distance));
                    }
                    builder.push_record(record);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format an ingestion report.
    pub fn format_report(&self, report: &IngestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures = |items: &[(String, String)]| -> Vec<serde_json::Value> {
                    items
                        .iter()
                        .map(|(item, error)| serde_json::json!({ "item": item, "error": error }))
                        .collect()
                };
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "discovered": report.discovered,
                    "skipped_cached": report.skipped_cached,
                    "extracted": report.extracted,
                    "empty": report.empty,
                    "failed": failures(&report.failed),
                    "failed_queries": failures(&report.failed_queries),
                }))?)
            }
            OutputFormat::Quiet => Ok(report.extracted.to_string()),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&report.to_string())];
                for (query, error) in &report.failed_queries {
                    lines.push(self.warning(&format!("query {:?}: {}", query, error)));
                }
                for (uri, error) in &report.failed {
                    lines.push(self.warning(&format!("{}: {}", uri, error)));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a list of URIs.
    pub fn format_uris(&self, uris: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(uris)?),
            OutputFormat::Quiet => Ok(uris.join("\n")),
            OutputFormat::Table => {
                if uris.is_empty() {
                    return Ok(self.colorize("Nothing pending.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "URI"]);
                for (n, uri) in uris.iter().enumerate() {
                    builder.push_record([(n + 1).to_string(), uri.clone()]);
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
