//! Sounddeck Session Engine
//!
//! The reconciliation core of the remote client: keeps client-side
//! playback state consistent with the backend under polling latency,
//! partial failure, and concurrent user actions.
//!
//! Three independently-updating sources of truth converge here:
//! - the backend's active-instance snapshots, polled at a fixed cadence;
//! - local optimistic state seeded by play/stop requests;
//! - persisted layout and visual overrides from `deck-settings`.
//!
//! [`Session`] owns all of it. Each poll pass applies one complete
//! server snapshot to the [`PlaybackTracker`]; passes are idempotent and
//! never interleave. Derived signals (the global playing flag, the
//! progress indicator, finished-sound notifications) flow out through a
//! broadcast event stream.
//!
//! # Example
//!
//! ```ignore
//! use deck_client::DeckClient;
//! use deck_session::Session;
//! use deck_settings::SettingsStore;
//! use deck_core::SoundId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DeckClient::new("http://127.0.0.1:8080")?;
//!     let settings = SettingsStore::open("settings.json");
//!     let mut session = Session::new(client, settings);
//!
//!     session.load_tabs().await?;
//!     session.play_sound(SoundId::new(42)).await?;
//!
//!     let view = session.playback_view().await;
//!     println!("playing: {}", view.any_playing);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod events;
mod poller;
mod search;
mod session;
mod tabs;
mod tracker;

pub use error::{Result, SessionError};
pub use events::{HostNotification, PlaybackStateChange, SessionEvent};
pub use poller::POLL_INTERVAL;
pub use search::SearchIndex;
pub use session::{PlaybackView, Session};
pub use tracker::{PlaybackTracker, POLL_ERROR_BUDGET};
