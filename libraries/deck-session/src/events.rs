//! Session events and inbound host notifications.
//!
//! Events are emitted at key points: tab activation, sound list arrival,
//! per-poll derived-state changes, instance completion, and sync
//! degradation. The tracker buffers them; the session forwards the
//! buffer into a broadcast channel after every mutation.

use deck_core::{SoundId, TabId};
use tokio::sync::broadcast;

/// Events emitted by the session engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The active tab changed.
    ///
    /// Always emitted BEFORE the new tab's sound list arrives, so
    /// dependent views can prepare layout state first.
    TabChanged {
        /// The newly active tab
        tab: TabId,
    },

    /// The display list for the active tab was (re)built
    SoundsLoaded {
        /// Owning tab
        tab: TabId,
        /// Number of sounds in the display list
        count: usize,
    },

    /// An instance vanished from the server snapshot: the sound finished
    SoundFinished {
        /// The sound whose instance completed
        sound: SoundId,
    },

    /// The derived "anything playing unpaused" flag changed
    PlayingChanged {
        /// New flag value
        any_playing: bool,
    },

    /// The maximum progress percentage across active instances changed
    ProgressChanged {
        /// New maximum, 0 when quiescent
        percent: f64,
    },

    /// Talk-through was toggled on the backend host
    TalkThroughChanged {
        /// New talk-through state
        active: bool,
    },

    /// The poll error budget was exhausted and playback state was reset
    SyncError,
}

/// Global playback state as reported by a host push notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStateChange {
    /// Something is playing unpaused
    Playing,
    /// Playback was paused globally
    Paused,
    /// Nothing is playing
    Stopped,
}

impl PlaybackStateChange {
    /// Map the notification label; anything unrecognized means stopped.
    pub fn from_label(label: &str) -> Self {
        match label {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// Inbound push-style notification from the backend's embedded runtime.
///
/// The only non-polled signals in the system. They update the same
/// derived flags the poller maintains — both paths converge on identical
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostNotification {
    /// Global playback state changed
    PlaybackState(PlaybackStateChange),
    /// Talk-through was started or stopped
    TalkThrough(bool),
}

/// Forward drained tracker events into the broadcast channel.
///
/// A send only fails when no receiver is subscribed, which is fine: the
/// session does not require listeners.
pub(crate) fn forward(events: Vec<SessionEvent>, tx: &broadcast::Sender<SessionEvent>) {
    for event in events {
        let _ = tx.send(event);
    }
}
