use thiserror::Error;

/// Failure of a single round trip to the hosting API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS error and the like.
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Body could not be read or did not have the expected shape.
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn network(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FetchError::Network {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub fn decode(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FetchError::Decode {
            url: url.into(),
            message: err.to_string(),
        }
    }
}

/// Failure of a tree search: a listing could not be fetched, or the pattern
/// engine gave up on an entry name (backtrack limit hit).
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Pattern match failed on '{name}': {message}")]
    Match { name: String, message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("One of username or organization must be specified")]
    MissingOwner,

    #[error("Invalid date '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid entry kind '{0}': expected 'file' or 'dir'")]
    InvalidEntryKind(String),
}
