//! CLI command definitions and argument parsing.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// factrag - Build a sourced fact base from the web and cite it.
#[derive(Debug, Parser)]
#[command(name = "factrag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data folder (overrides [store] root)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Debug logging (RUST_LOG still applies when not set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default configuration file
    Init(InitArgs),

    /// Discover sources and extract facts from them
    #[command(subcommand)]
    Ingest(IngestSource),

    /// Facts nearest to a query
    Query(QueryArgs),

    /// Facts added in the last few days
    Recent(RecentArgs),

    /// List stored facts
    Facts(FactsArgs),

    /// Show one fact
    Show(ShowArgs),

    /// Add a fact by hand
    AddFact(AddFactArgs),

    /// Resolve [fN] references in a document to numbered sources
    Cite(CiteArgs),

    /// Ask a question answered from stored facts
    Ask(AskArgs),

    /// List cached content not yet marked accessed
    Pending(PendingArgs),

    /// Put a local file into the content cache
    CacheAdd(CacheAddArgs),
}

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Topic used to focus fact extraction.
#[derive(Debug, Args)]
pub struct TopicArg {
    /// What the facts should be about
    #[arg(short, long)]
    pub topic: String,
}

/// Where to ingest from.
#[derive(Debug, Subcommand)]
pub enum IngestSource {
    /// Specific URLs
    Url {
        /// URLs to crawl
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        topic: TopicArg,
    },

    /// Google Custom Search results
    Search {
        /// Search queries
        #[arg(required = true)]
        queries: Vec<String>,

        #[command(flatten)]
        topic: TopicArg,

        /// Google API key
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        google_api_key: Option<String>,

        /// Google search engine ID
        #[arg(long, env = "GOOGLE_SEARCH_ID")]
        google_search_id: Option<String>,
    },

    /// NewsAPI articles
    News {
        /// News queries
        #[arg(required = true)]
        queries: Vec<String>,

        #[command(flatten)]
        topic: TopicArg,

        /// NewsAPI key
        #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
        newsapi_key: Option<String>,

        /// Use top headlines instead of the full archive
        #[arg(long)]
        top_headlines: bool,
    },

    /// Items of RSS or Atom feeds
    Rss {
        /// Feed URLs
        #[arg(required = true)]
        feeds: Vec<String>,

        #[command(flatten)]
        topic: TopicArg,
    },

    /// Content obtained elsewhere, stored under a URI
    Content {
        /// URI recorded as the facts' source
        #[arg(long)]
        uri: String,

        /// File holding the text
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        topic: TopicArg,
    },
}

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Query text
    pub query: String,

    /// Number of results; negative returns every fact
    #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
    pub n_results: i64,

    /// Only facts added strictly after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub since: Option<DateTime<Utc>>,
}

/// Arguments for the recent command.
#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Window length in days (fractions allowed)
    #[arg(short, long, default_value = "1")]
    pub days: f64,
}

/// Arguments for the facts command.
#[derive(Debug, Args)]
pub struct FactsArgs {
    /// Only facts added at or after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub since: Option<DateTime<Utc>>,
}

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Fact ID (e.g. f12)
    pub id: String,
}

/// Arguments for the add-fact command.
#[derive(Debug, Args)]
pub struct AddFactArgs {
    /// Fact text
    pub content: String,

    /// Source URI
    #[arg(short, long)]
    pub source: String,
}

/// Arguments for the cite command.
#[derive(Debug, Args)]
pub struct CiteArgs {
    /// Document to resolve (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Emit HTML anchors and fact spans
    #[arg(long)]
    pub html: bool,

    /// Number after which citation numbering starts
    #[arg(long, default_value = "0")]
    pub start_count: u64,
}

/// Arguments for the ask command.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question
    pub question: String,

    /// Keep raw [fN] references in the answer
    #[arg(long)]
    pub no_clean: bool,

    /// Attempts (overrides [synthesizer] max_attempts)
    #[arg(long)]
    pub attempts: Option<u32>,
}

/// Arguments for the pending command.
#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Mark the listed entries accessed
    #[arg(long)]
    pub mark_accessed: bool,
}

/// Arguments for the cache-add command.
#[derive(Debug, Args)]
pub struct CacheAddArgs {
    /// File to add
    pub file: PathBuf,

    /// URI to store it under (content hash when omitted)
    #[arg(long)]
    pub uri: Option<String>,
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got {:?}", value))
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ingest_url_command() {
        let cli = Cli::parse_from([
            "factrag",
            "ingest",
            "url",
            "https://a.example",
            "https://b.example",
            "--topic",
            "wheat prices",
        ]);
        match cli.command {
            Command::Ingest(IngestSource::Url { urls, topic }) => {
                assert_eq!(urls.len(), 2);
                assert_eq!(topic.topic, "wheat prices");
            }
            other => panic!("Expected ingest url, got {:?}", other),
        }
    }

    #[test]
    fn test_query_negative_n_results() {
        let cli = Cli::parse_from(["factrag", "query", "reactor", "-n", "-1", "--since", "2024-03-01"]);
        match cli.command {
            Command::Query(args) => {
                assert_eq!(args.n_results, -1);
                assert_eq!(args.since, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
            }
            other => panic!("Expected query, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["factrag", "cite", "doc.txt", "--html", "-v", "--root", "/tmp/x"]);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Cite(CiteArgs { html: true, .. })));
    }

    #[test]
    fn test_parse_timestamp() {
        let at = parse_timestamp("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_format_conversion() {
        let format: crate::config::OutputFormat = CliFormat::Json.into();
        assert_eq!(format, crate::config::OutputFormat::Json);
    }
}
