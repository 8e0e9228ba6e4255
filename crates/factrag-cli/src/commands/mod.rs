//! Command implementations.

pub mod ask;
pub mod cache;
pub mod cite;
pub mod facts;
pub mod ingest;
pub mod init;

pub use self::ask::execute_ask;
pub use self::cache::{execute_cache_add, execute_pending};
pub use self::cite::execute_cite;
pub use self::facts::{execute_add_fact, execute_facts, execute_query, execute_recent, execute_show};
pub use self::ingest::execute_ingest;
pub use self::init::execute_init;
