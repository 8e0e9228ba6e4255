//! Fact store commands: query, recent, facts, show, add-fact.

use crate::cli::{AddFactArgs, FactsArgs, QueryArgs, RecentArgs, ShowArgs};
use crate::config::{Config, OutputFormat};
use crate::context;
use crate::error::Result;
use crate::output::Formatter;
use chrono::Utc;
use factrag_store::QueryLimit;

/// Execute the query command.
pub fn execute_query(args: QueryArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = context::open_store(config)?;
    let limit = QueryLimit::from_n_results(args.n_results);
    let facts = store.query_to_fact_list(&args.query, limit, args.since)?;
    println!("{}", formatter.format_retrieved(&facts)?);
    Ok(())
}

/// Execute the recent command.
///
/// Table output prints the same fact block that prompts receive.
pub fn execute_recent(args: RecentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = context::open_store(config)?;
    match formatter.format() {
        OutputFormat::Table => {
            let block = store.get_all_recent_facts(args.days, false)?;
            if block.is_empty() {
                println!("{}", formatter.info("No facts in that window."));
            } else {
                print!("{}", block);
            }
        }
        OutputFormat::Json | OutputFormat::Quiet => {
            let facts = store.recent_facts_at(args.days, Utc::now())?;
            println!("{}", formatter.format_facts(facts)?);
        }
    }
    Ok(())
}

/// Execute the facts command.
pub fn execute_facts(args: FactsArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = context::open_store(config)?;
    println!("{}", formatter.format_facts(store.get_facts(args.since))?);
    Ok(())
}

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = context::open_store(config)?;
    let fact = store.get_fact(&args.id)?;
    println!("{}", formatter.format_facts([fact])?);
    Ok(())
}

/// Execute the add-fact command.
pub fn execute_add_fact(args: AddFactArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = context::open_store(config)?;
    let id = store.add_fact(&args.content, &args.source)?;
    match formatter.format() {
        OutputFormat::Quiet => println!("{}", id),
        _ => println!("{}", formatter.success(&format!("Fact added: {}", id))),
    }
    Ok(())
}
