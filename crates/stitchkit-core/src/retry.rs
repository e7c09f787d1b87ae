//! Retry with exponential backoff for HTTP calls

use std::time::Duration;

use indicatif::ProgressBar;

use crate::http::{FetchError, http_config};

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a request with exponential backoff, up to the configured
/// `max_retries` (from the global [`HttpConfig`](crate::HttpConfig)).
pub fn retry_with_backoff<T>(
    label: &str,
    pb: &ProgressBar,
    attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    retry_n(label, http_config().max_retries, pb, attempt_fn)
}

/// Same as [`retry_with_backoff`] with an explicit retry budget.
///
/// Non-retryable errors are returned at once.
pub fn retry_n<T>(
    label: &str,
    max_retries: u32,
    pb: &ProgressBar,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = backoff_duration(attempt);
                pb.set_message(format!("retry {attempt}/{max_retries} in {delay:?}"));
                log::warn!("{label}: {e}, retry {attempt}/{max_retries} in {delay:?}");
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::error!("failed: {label}: {e}");
                return Err(e);
            }
        }
    }
}
