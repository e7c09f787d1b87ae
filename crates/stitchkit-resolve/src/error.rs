//! Errors that abort a resolution job

use stitchkit_core::FetchError;

#[derive(Debug)]
pub enum ResolveError {
    /// Two records for one name carried different codes
    Conflict {
        name: String,
        first: String,
        second: String,
    },
    /// A search record with neither `_approvalIDDisplay` nor `approvalID`
    Malformed { name: String },
    /// Parentheses don't balance in a delimited ingredient list
    UnbalancedParens { text: String },
    /// Bad header or short line in a UNII or override table
    Format { line: usize, message: String },
    Fetch(FetchError),
    Io(std::io::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict {
                name,
                first,
                second,
            } => write!(f, "conflicting UNIIs returned for {name:?}: {first} vs {second}"),
            Self::Malformed { name } => {
                write!(f, "UNII search response not properly formatted: {name:?}")
            }
            Self::UnbalancedParens { text } => {
                write!(f, "unbalanced parentheses in ingredients: {text:?}")
            }
            Self::Format { line, message } => write!(f, "line {line}: {message}"),
            Self::Fetch(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}
