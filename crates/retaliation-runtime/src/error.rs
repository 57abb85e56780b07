//! Error types for the runtime crate.

use thiserror::Error;

/// Errors that can occur while querying the status source.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// The configured base URL cannot be extended to the REST path.
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for status source operations.
pub type Result<T> = std::result::Result<T, StatusError>;
