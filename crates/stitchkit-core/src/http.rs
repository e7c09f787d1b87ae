//! Blocking HTTP helpers over one shared async client.
//!
//! The jobs are plain sequential code, so requests are driven to completion
//! on a small shared tokio runtime and handed back synchronously.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("stitchkit/", env!("CARGO_PKG_VERSION"));

/// Process-wide HTTP settings (config file defaults, CLI overrides).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub read_timeout: Duration,
    /// Retry attempts for transient failures
    pub max_retries: u32,
    /// Accept self-signed certificates (internal Stitcher instances)
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            max_retries: 3,
            accept_invalid_certs: false,
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the HTTP settings. Must run before the first request.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::warn!("HTTP config already initialized, keeping the first one");
    }
}

/// Current HTTP settings (defaults if never set).
pub fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Error from a single HTTP exchange
#[derive(Debug)]
pub enum FetchError {
    /// Transport failure or non-2xx status
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Body was not the JSON we expected
    Decode(String),
    /// Local I/O
    Io(std::io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Whether a later attempt could succeed.
    ///
    /// Rate limiting, server errors, timeouts and connection failures are
    /// transient; other 4xx responses and undecodable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => {
                matches!(status, None | Some(408) | Some(429) | Some(500..=599))
            }
            Self::Decode(_) => false,
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let config = http_config();
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(config.read_timeout)
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// GET a URL and return the body as text.
pub fn get_text(url: &str) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = http_client()
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))
    })
}

/// GET a URL and decode the body as JSON.
pub fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let body = get_text(url)?;
    Ok(serde_json::from_str(&body)?)
}

/// POST a JSON document and return the response body.
pub fn post_json(url: &str, body: &serde_json::Value) -> Result<String, FetchError> {
    let payload = serde_json::to_string(body)?;
    SHARED_RUNTIME.handle().block_on(async {
        let response = http_client()
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> FetchError {
        FetchError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn rate_limit_retryable() {
        assert!(http_err(429).is_retryable());
    }

    #[test]
    fn server_errors_retryable() {
        assert!(http_err(500).is_retryable());
        assert!(http_err(503).is_retryable());
    }

    #[test]
    fn not_found_not_retryable() {
        assert!(!http_err(404).is_retryable());
        assert!(!http_err(400).is_retryable());
    }

    #[test]
    fn transport_error_retryable() {
        let err = FetchError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_error_not_retryable() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(!err.is_retryable());
        assert!(format!("{err}").starts_with("invalid response body"));
    }

    #[test]
    fn storage_full_not_retryable() {
        let err = FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::StorageFull,
            "disk full",
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_with_status() {
        assert_eq!(format!("{}", http_err(502)), "HTTP 502: test");
        assert_eq!(http_err(502).status(), Some(502));
    }

    #[test]
    fn default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(!config.accept_invalid_certs);
    }
}
