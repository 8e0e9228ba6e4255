//! Content cache commands: pending, cache-add.

use crate::cli::{CacheAddArgs, PendingArgs};
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the pending command.
pub fn execute_pending(args: PendingArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let cache = context::open_cache(config)?;
    let pending = cache.get_unaccessed_content()?;
    println!("{}", formatter.format_uris(&pending)?);

    if args.mark_accessed {
        for uri in &pending {
            cache.log_access(uri)?;
        }
        eprintln!("{}", formatter.info(&format!("Marked {} entries accessed", pending.len())));
    }
    Ok(())
}

/// Execute the cache-add command.
pub fn execute_cache_add(args: CacheAddArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let cache = context::open_cache(config)?;
    let key = cache.add_content_from_file(&args.file, args.uri.as_deref())?;
    println!("{}", formatter.success(&format!("Cached as {}", key)));
    Ok(())
}
