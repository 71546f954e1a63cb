//! Retry helpers shared by the HTTP providers.

use std::time::Duration;

use crate::ports::AIError;

/// Longest wait between attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Exponential backoff for retry `attempt` (0-based): 1s, 2s, 4s, capped.
pub fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_BACKOFF)
}

/// Maps a reqwest send failure to an [`AIError`].
pub fn map_send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}
