//! Stitcher API errors

use stitchkit_core::FetchError;

#[derive(Debug)]
pub enum StitcherError {
    /// Unknown site shorthand or unusable URL
    Site(String),
    /// Bad line in a curation dump
    Curation { line: usize, message: String },
    /// The API refused a posted curation
    Rejected { pair: String, message: String },
    Fetch(FetchError),
    Io(std::io::Error),
}

impl std::fmt::Display for StitcherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Site(s) => write!(f, "unknown site {s:?} (use prod, dev, test, local, docker or a URL)"),
            Self::Curation { line, message } => write!(f, "curation line {line}: {message}"),
            Self::Rejected { pair, message } => write!(f, "curation {pair} rejected: {message}"),
            Self::Fetch(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for StitcherError {}

impl StitcherError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
            _ => false,
        }
    }
}

impl From<FetchError> for StitcherError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<std::io::Error> for StitcherError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
