//! Schema versioning shared by the cache and fact databases

use crate::{Result, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

/// Bring a database up to `supported`, refusing newer versions
///
/// Version 0 is a fresh file; the schema script is idempotent so it is also
/// safe on a partially initialized one.
pub(crate) fn migrate(conn: &Connection, schema: &str, supported: i64) -> Result<()> {
    let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > supported {
        return Err(StoreError::SchemaVersion { found, supported });
    }
    if found < supported {
        conn.execute_batch(schema)?;
        conn.pragma_update(None, "user_version", supported)?;
    }
    Ok(())
}

/// Lowercase hex SHA-256 of a string
pub(crate) fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

pub(crate) fn timestamp_to_sql(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_from_sql(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("Bad timestamp {:?}: {}", value, e)))
}
