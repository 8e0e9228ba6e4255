//! Bounded retry of whole composition sequences

use crate::error::SynthError;
use tracing::warn;

/// Run `op` up to `max_attempts` times
///
/// Retries only while the error is retryable (see
/// [`SynthError::is_retryable`]); the last error is returned when attempts
/// run out. `max_attempts` of 0 is treated as 1.
pub fn run_with_retry<T, F>(max_attempts: u32, mut op: F) -> Result<T, SynthError>
where
    F: FnMut(u32) -> Result<T, SynthError>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(attempt, max_attempts = attempts, error = %e, "Attempt failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
