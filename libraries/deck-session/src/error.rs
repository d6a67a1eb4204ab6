//! Error types for the session engine.

use deck_client::ClientError;
use deck_core::SoundId;
use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A backend request failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The backend answered a play request without a usable instance.
    ///
    /// Covers both an explicit `success: false` and a malformed response
    /// missing the instance id; either way no tracking state was left
    /// behind.
    #[error("Backend rejected play request for sound {0}")]
    PlayRejected(SoundId),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
