//! Cite command implementation.

use crate::cli::CiteArgs;
use crate::config::{Config, OutputFormat};
use crate::context;
use crate::error::Result;
use crate::output::Formatter;
use factrag_synthesizer::{CitationResolver, CitationStyle};
use std::{fs, io};

/// Execute the cite command.
pub fn execute_cite(args: CiteArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };

    let style = if args.html {
        CitationStyle::Html
    } else {
        config.synthesizer.style
    };
    let store = context::open_store(config)?;
    let resolver = CitationResolver::new(style)?;
    let resolved = resolver.resolve(&text, &store, args.start_count)?;

    match formatter.format() {
        OutputFormat::Json => {
            let sources: Vec<serde_json::Value> = resolved
                .citations
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "number": c.number,
                        "fact_id": c.fact_id.to_string(),
                        "source": c.source,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "text": resolved.text,
                    "notes": resolved.notes,
                    "next_count": resolved.next_count,
                    "citations": sources,
                }))?
            );
        }
        _ => print!("{}", resolved.document(style)),
    }
    Ok(())
}
