//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the soundboard backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend is offline or unreachable
    #[error("Backend unreachable: {0}")]
    ServerUnreachable(String),

    /// Backend returned an error response
    #[error("Backend error ({status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Backend rejected the request as unauthorized.
    ///
    /// A hard stop: the caller must send the user through login, there is
    /// nothing to retry.
    #[error("Unauthorized")]
    Unauthorized,

    /// Failed to parse a backend response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid backend URL
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
