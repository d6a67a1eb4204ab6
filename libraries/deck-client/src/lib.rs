//! Sounddeck Backend Client
//!
//! HTTP client for the soundboard backend's local REST API.
//!
//! Wraps every outbound request with uniform error normalization: error
//! messages are extracted from JSON bodies where the backend provides
//! them, a 401 is a hard [`ClientError::Unauthorized`] stop, and every
//! request outcome flips the shared [`ConnectionStatus`] indicator.
//!
//! # Example
//!
//! ```ignore
//! use deck_client::DeckClient;
//! use deck_core::SoundId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DeckClient::new("http://127.0.0.1:8080")?;
//!
//!     let tabs = client.tabs().await?;
//!     println!("Found {} tabs", tabs.len());
//!
//!     let response = client.play_sound(SoundId::new(42)).await?;
//!     println!("Playing as instance {:?}", response.playing_id);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod error;
mod status;
mod types;

// Re-export main types
pub use client::DeckClient;
pub use error::{ClientError, Result};
pub use status::ConnectionStatus;
pub use types::{InstanceProgress, PlayResponse};
