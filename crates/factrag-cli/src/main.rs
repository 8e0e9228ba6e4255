//! factrag CLI - build a sourced fact base and cite it.

use clap::Parser;
use factrag_cli::commands;
use factrag_cli::config::OutputFormat;
use factrag_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> factrag_cli::Result<()> {
    if let Command::Init(args) = cli.command {
        let formatter = Formatter::new(OutputFormat::Table, !cli.no_color);
        return commands::execute_init(args, cli.config.as_deref(), &formatter);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.store.root = root;
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, !cli.no_color && config.settings.color);

    match cli.command {
        Command::Init(_) => Ok(()),
        Command::Ingest(source) => commands::execute_ingest(source, &config, &formatter),
        Command::Query(args) => commands::execute_query(args, &config, &formatter),
        Command::Recent(args) => commands::execute_recent(args, &config, &formatter),
        Command::Facts(args) => commands::execute_facts(args, &config, &formatter),
        Command::Show(args) => commands::execute_show(args, &config, &formatter),
        Command::AddFact(args) => commands::execute_add_fact(args, &config, &formatter),
        Command::Cite(args) => commands::execute_cite(args, &config, &formatter),
        Command::Ask(args) => commands::execute_ask(args, &config, &formatter),
        Command::Pending(args) => commands::execute_pending(args, &config, &formatter),
        Command::CacheAdd(args) => commands::execute_cache_add(args, &config, &formatter),
    }
}
