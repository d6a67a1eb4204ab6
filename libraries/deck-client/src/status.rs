//! Shared connectivity indicator.

use tokio::sync::watch;

/// Latest known connectivity to the backend.
///
/// Updated as a side effect of every request outcome; there is no
/// background health check. The next user-initiated or polled request is
/// the retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No request has completed yet
    #[default]
    Unknown,
    /// The last request succeeded
    Connected,
    /// The last request failed
    Disconnected,
}

impl ConnectionStatus {
    /// Human-readable indicator text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Watch-channel wrapper the client publishes status changes through.
#[derive(Debug)]
pub(crate) struct StatusPublisher {
    tx: watch::Sender<ConnectionStatus>,
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionStatus::Unknown);
        Self { tx }
    }

    /// Publish only on change so subscribers are not woken every request.
    pub(crate) fn set(&self, status: ConnectionStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.tx.subscribe()
    }
}
