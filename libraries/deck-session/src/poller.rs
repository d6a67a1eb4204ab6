//! The progress polling task.
//!
//! One cancellable repeating task per polling session. Each pass fetches
//! the full active-instance snapshot and applies it to the tracker; the
//! task exits on its own when tracking goes empty or the error budget is
//! exhausted. Passes never interleave: a single task runs them strictly
//! in sequence, and a skipped tick is harmless because every pass starts
//! from a complete snapshot rather than accumulating deltas.

use crate::events::{self, SessionEvent};
use crate::tracker::PlaybackTracker;
use deck_client::DeckClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Poll cadence while instances are tracked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// State shared between the session and its polling task.
#[derive(Debug)]
pub(crate) struct Shared {
    /// The playback state machine
    pub tracker: PlaybackTracker,

    /// Bumped whenever playback state is reshaped outside the poll loop
    /// (play seed, stop-all, hard reset).
    ///
    /// A pass captures the epoch before its fetch and re-checks it before
    /// applying, so a snapshot that predates the reshaping cannot
    /// resurrect cleared state or finish a just-seeded instance.
    pub epoch: u64,
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            tracker: PlaybackTracker::new(),
            epoch: 0,
        }
    }
}

/// Spawn the polling task.
pub(crate) fn spawn(
    client: Arc<DeckClient>,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<SessionEvent>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Progress polling started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // Nothing tracked: go idle without a guaranteed-empty round
            // trip
            let epoch = {
                let state = shared.lock().await;
                if state.tracker.is_empty() {
                    break;
                }
                state.epoch
            };

            match client.progress().await {
                Ok(snapshot) => {
                    let mut state = shared.lock().await;
                    if state.epoch != epoch {
                        // Playback state was reshaped while this fetch was
                        // in flight; drop the stale snapshot and re-check
                        // on the next tick
                        continue;
                    }
                    state.tracker.apply_snapshot(&snapshot);
                    events::forward(state.tracker.drain_events(), &events);
                    if state.tracker.is_empty() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Progress poll failed");
                    let mut state = shared.lock().await;
                    if state.epoch != epoch {
                        continue;
                    }
                    let exhausted = state.tracker.apply_poll_failure();
                    events::forward(state.tracker.drain_events(), &events);
                    if exhausted {
                        state.epoch += 1;
                        error!("Poll error budget exhausted, playback state reset");
                        break;
                    }
                }
            }
        }
        debug!("Progress polling stopped");
    })
}
