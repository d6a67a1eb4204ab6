//! Playback tracking state machine.
//!
//! [`PlaybackTracker`] owns every piece of client-side playback state:
//! the tracked-instance map, the currently-playing index, and the derived
//! global flags. All mutation funnels through its methods — the poller
//! and the play/stop entry points are the only writers, and presentation
//! code reads a cloned projection.
//!
//! Each reconciliation pass is a pure function of (previous state, server
//! snapshot): the same snapshot applied twice leaves identical state and
//! emits no further events.

use crate::events::{PlaybackStateChange, SessionEvent};
use deck_client::InstanceProgress;
use deck_core::{InstanceId, PlayingInstance, SoundId};
use std::collections::HashMap;
use tracing::warn;

/// Consecutive poll failures tolerated before playback state is reset.
pub const POLL_ERROR_BUDGET: u32 = 5;

/// Client-side playback state, reconciled against server snapshots.
#[derive(Debug, Default)]
pub struct PlaybackTracker {
    /// Every instance believed active, keyed by instance id
    instances: HashMap<InstanceId, PlayingInstance>,

    /// The 1:1 sound → instance index.
    ///
    /// At most one instance per sound is tracked; the last-known instance
    /// wins. A deliberate simplification — the backend may allow
    /// overlapping plays of the same sound, the client model does not.
    currently_playing: HashMap<SoundId, InstanceId>,

    /// Derived: at least one instance is playing unpaused.
    ///
    /// Recomputed from the full snapshot every pass, never from deltas,
    /// so it cannot drift after a missed update.
    any_playing: bool,

    /// Derived: maximum progress percentage across all instances
    max_progress: f64,

    /// Set when the user paused via the global toggle; cleared when
    /// playback reaches its natural end
    paused_by_toggle: bool,

    /// Talk-through state, driven by host notifications only
    talk_through: bool,

    /// Consecutive failed polls
    consecutive_errors: u32,

    /// Events buffered for the session to drain and forward
    pending_events: Vec<SessionEvent>,
}

impl PlaybackTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Reads =====

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of tracked instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The tracked instances, unordered.
    pub fn instances(&self) -> impl Iterator<Item = &PlayingInstance> {
        self.instances.values()
    }

    /// The instance currently indexed for a sound.
    pub fn instance_for(&self, sound: SoundId) -> Option<&PlayingInstance> {
        self.currently_playing
            .get(&sound)
            .and_then(|id| self.instances.get(id))
    }

    /// Whether a sound has a believed-active instance.
    pub fn is_playing(&self, sound: SoundId) -> bool {
        self.currently_playing.contains_key(&sound)
    }

    /// The derived "anything playing unpaused" flag.
    pub fn any_playing(&self) -> bool {
        self.any_playing
    }

    /// Maximum progress percentage across all instances.
    pub fn max_progress_percent(&self) -> f64 {
        self.max_progress
    }

    /// Whether the user paused via the global toggle.
    pub fn paused_by_toggle(&self) -> bool {
        self.paused_by_toggle
    }

    /// Talk-through state.
    pub fn talk_through(&self) -> bool {
        self.talk_through
    }

    /// Consecutive failed polls so far.
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    // ===== Play / stop entry points =====

    /// Seed tracking from a successful play response.
    ///
    /// Records the sound → instance index entry and an unpaused instance
    /// with the server-reported length and a zeroed cursor. A previous
    /// instance of the same sound is superseded (last wins).
    pub fn record_play(&mut self, sound: SoundId, instance: InstanceId, length_ms: u64) {
        if let Some(old) = self.currently_playing.insert(sound, instance) {
            self.instances.remove(&old);
        }
        self.instances
            .insert(instance, PlayingInstance::started(instance, sound, length_ms));
        self.set_any_playing(true);
    }

    /// Drop the index entry for a sound after a failed play request.
    ///
    /// A failed or malformed play response must not leave a dangling
    /// reference behind.
    pub fn rollback_play(&mut self, sound: SoundId) {
        self.currently_playing.remove(&sound);
    }

    /// Record the user's global pause toggle.
    pub fn set_paused_by_toggle(&mut self, paused: bool) {
        self.paused_by_toggle = paused;
    }

    /// Force everything back to quiescent (stop-all, hard reset).
    pub fn clear_all(&mut self) {
        self.instances.clear();
        self.currently_playing.clear();
        self.consecutive_errors = 0;
        self.paused_by_toggle = false;
        self.set_any_playing(false);
        self.set_max_progress(0.0);
    }

    // ===== Reconciliation =====

    /// Apply one authoritative server snapshot.
    ///
    /// Ordering within the pass is load-bearing: instances are updated
    /// from the snapshot, then vanished instances are detected and
    /// removed, then the global flags are recomputed from what remains.
    pub fn apply_snapshot(&mut self, snapshot: &[InstanceProgress]) {
        self.consecutive_errors = 0;

        // Update every reported instance, creating records for plays this
        // client never saw (e.g. another client triggered them)
        for report in snapshot {
            let entry = self.instances.entry(report.id).or_insert_with(|| {
                warn!(
                    instance = %report.id,
                    sound = %report.sound_id,
                    "Tracking instance with no local play event"
                );
                self.currently_playing.insert(report.sound_id, report.id);
                PlayingInstance::discovered(report.id, report.sound_id)
            });

            // Absent fields mean "unchanged", never "reset to zero"
            if let Some(read_ms) = report.read_ms {
                entry.read_ms = read_ms;
            }
            if let Some(length_ms) = report.length_ms {
                if length_ms > 0 {
                    entry.length_ms = length_ms;
                }
            }
            if let Some(paused) = report.paused {
                entry.paused = paused;
            }
            if let Some(repeat) = report.repeat {
                entry.repeat = repeat;
            }
            if let Some(name) = &report.name {
                entry.name.clone_from(name);
            }
        }

        // Anything we track that the snapshot no longer contains is
        // finished
        let finished: Vec<InstanceId> = self
            .instances
            .keys()
            .filter(|id| !snapshot.iter().any(|r| r.id == **id))
            .copied()
            .collect();
        for id in finished {
            if let Some(instance) = self.instances.remove(&id) {
                if self.currently_playing.get(&instance.sound_id) == Some(&id) {
                    self.currently_playing.remove(&instance.sound_id);
                }
                self.pending_events.push(SessionEvent::SoundFinished {
                    sound: instance.sound_id,
                });
            }
        }

        // Full recomputation from the snapshot's survivors, silently
        // correcting any drift
        let any_playing = self.instances.values().any(|i| !i.paused);
        self.set_any_playing(any_playing);

        let max_progress = self
            .instances
            .values()
            .map(PlayingInstance::progress_percent)
            .fold(0.0_f64, f64::max);
        self.set_max_progress(max_progress);

        // Natural completion overrides an explicit pause-toggle state
        if !any_playing && self.instances.is_empty() {
            self.paused_by_toggle = false;
        }
    }

    /// Record one failed poll.
    ///
    /// Derived flags go pessimistic immediately ("nothing playing" until
    /// the next successful poll proves otherwise); tracked state is only
    /// cleared when the budget is exhausted. Returns `true` on the hard
    /// reset.
    pub fn apply_poll_failure(&mut self) -> bool {
        self.consecutive_errors += 1;
        self.set_any_playing(false);
        self.set_max_progress(0.0);

        if self.consecutive_errors >= POLL_ERROR_BUDGET {
            self.clear_all();
            self.pending_events.push(SessionEvent::SyncError);
            return true;
        }
        false
    }

    // ===== Host notifications =====

    /// Apply a pushed global playback-state change.
    ///
    /// Converges on the same flag semantics as the poll path.
    pub fn apply_host_playback_state(&mut self, change: PlaybackStateChange) {
        match change {
            PlaybackStateChange::Playing => {
                self.set_any_playing(true);
                self.paused_by_toggle = false;
            }
            PlaybackStateChange::Paused => {
                self.set_any_playing(false);
                self.paused_by_toggle = true;
            }
            PlaybackStateChange::Stopped => {
                self.set_any_playing(false);
                self.paused_by_toggle = false;
            }
        }
    }

    /// Apply a pushed talk-through state change.
    pub fn apply_talk_through(&mut self, active: bool) {
        if self.talk_through != active {
            self.talk_through = active;
            self.pending_events
                .push(SessionEvent::TalkThroughChanged { active });
        }
    }

    // ===== Events =====

    /// Drain all pending events.
    ///
    /// Returns everything emitted since the last drain; the session
    /// forwards these into its broadcast channel.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn set_any_playing(&mut self, any_playing: bool) {
        if self.any_playing != any_playing {
            self.any_playing = any_playing;
            self.pending_events
                .push(SessionEvent::PlayingChanged { any_playing });
        }
    }

    fn set_max_progress(&mut self, percent: f64) {
        if self.max_progress != percent {
            self.max_progress = percent;
            self.pending_events
                .push(SessionEvent::ProgressChanged { percent });
        }
    }
}
