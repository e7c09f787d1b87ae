//! Stitchkit Core - shared plumbing for the curation jobs
//!
//! Every job in the workspace is a sequential batch run: read a file or walk
//! an HTTP API, normalize identifiers, write a report. This crate holds the
//! pieces they share: logging, progress lines, the blocking HTTP client with
//! retry, graceful shutdown, and delimited-text I/O.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;
pub mod tabular;

// Re-exports for convenience
pub use http::{
    FetchError, HttpConfig, SHARED_RUNTIME, get_json, get_text, http_client, http_config,
    post_json, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{backoff_duration, retry_with_backoff};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
pub use tabular::{TabTable, TextSink, open_text};
