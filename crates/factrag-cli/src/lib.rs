//! factrag CLI library.
//!
//! Wires the cache, fact store, extractor, ingestion adapters and citation
//! resolver together from a TOML configuration.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
