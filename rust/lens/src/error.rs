//! Error types for search sessions and the search client.

use thiserror::Error;

/// Result type alias for iplens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for iplens operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Submit was attempted with a query whose media type is not `image/*`.
    #[error("iplens: invalid media type {media_type:?}, expected image/*")]
    InvalidMediaType { media_type: String },

    /// Submit was attempted before any query image was selected.
    #[error("iplens: no query image selected")]
    NoQueryImage,

    /// The search call produced no response.
    #[error("iplens: network failure: {0}")]
    NetworkFailure(String),

    /// The search call returned a non-success status.
    #[error("iplens: server error ({status}): {detail}")]
    ServerError { status: u16, detail: String },

    /// A comparison was requested against a candidate not in the current result set.
    #[error("iplens: candidate {id:?} is not in the current result set")]
    StaleSelection { id: String },

    /// A submit was requested while another one is in flight.
    #[error("iplens: a search is already in flight")]
    SessionBusy,

    /// The response body could not be decoded.
    #[error("json error: {0}")]
    Json(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a server error.
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Error::ServerError {
            status,
            detail: detail.into(),
        }
    }

    /// Returns true if the search call never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkFailure(_))
    }

    /// Returns true if the server answered with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::ServerError { status, .. } if *status >= 500)
    }

    /// Returns true if a manual resubmission may succeed.
    ///
    /// Nothing in this crate retries on its own; callers use this to decide
    /// whether to offer a retry.
    pub fn is_retryable(&self) -> bool {
        self.is_network() || self.is_server_error()
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::server(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ),
            None => Error::NetworkFailure(e.to_string()),
        }
    }
}
