//! Ask command implementation.

use crate::cli::AskArgs;
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::output::Formatter;
use factrag_synthesizer::{run_with_retry, FactBot};

/// Execute the ask command.
pub fn execute_ask(args: AskArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = context::open_store(config)?;
    if store.count_facts() == 0 {
        println!("{}", formatter.warning("The fact store is empty; the answer will not cite anything."));
    }

    let mut synthesizer = config.synthesizer.clone();
    if args.no_clean {
        synthesizer.clean_sources = false;
    }
    let attempts = args.attempts.unwrap_or(synthesizer.max_attempts);

    let mut bot = FactBot::with_config(&store, context::chat_model(config)?, &config.extractor.prompts, &synthesizer)?;
    let answer = run_with_retry(attempts, |_| bot.ask(&args.question))?;
    println!("{}", answer);
    Ok(())
}
