/// Playing-instance tracking type
use crate::types::{InstanceId, SoundId};
use serde::{Deserialize, Serialize};

/// One in-flight playback of a sound, tracked client-side.
///
/// Created on a successful play request (or discovered via a progress
/// snapshot when another client started the sound). Authoritative fields
/// are refreshed on every reconciliation pass; the record is destroyed
/// when the backend's active-instance set no longer contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingInstance {
    /// Backend-assigned id for this playback instance
    pub instance_id: InstanceId,

    /// The sound being played
    pub sound_id: SoundId,

    /// Sound display name, `"?"` until a snapshot fills it in
    pub name: String,

    /// Total length in milliseconds, 0 if unknown
    pub length_ms: u64,

    /// Playback cursor in milliseconds
    pub read_ms: u64,

    /// Whether the instance is paused
    pub paused: bool,

    /// Whether the instance repeats on completion
    pub repeat: bool,
}

impl PlayingInstance {
    /// Instance seeded from a successful play response: known length,
    /// zeroed cursor, unpaused.
    pub fn started(instance_id: InstanceId, sound_id: SoundId, length_ms: u64) -> Self {
        Self {
            instance_id,
            sound_id,
            name: "?".to_string(),
            length_ms,
            read_ms: 0,
            paused: false,
            repeat: false,
        }
    }

    /// Instance discovered in a progress snapshot without a local play
    /// event (e.g. another client triggered it). Unknown fields default
    /// conservatively: placeholder name, paused until proven otherwise.
    pub fn discovered(instance_id: InstanceId, sound_id: SoundId) -> Self {
        Self {
            instance_id,
            sound_id,
            name: "?".to_string(),
            length_ms: 0,
            read_ms: 0,
            paused: true,
            repeat: false,
        }
    }

    /// Playback progress as a percentage.
    ///
    /// `clamp(read / length * 100, 0, 100)` while unpaused with a known
    /// length; 0 otherwise.
    pub fn progress_percent(&self) -> f64 {
        if self.paused || self.length_ms == 0 {
            return 0.0;
        }
        (self.read_ms as f64 / self.length_ms as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(read_ms: u64, length_ms: u64, paused: bool) -> PlayingInstance {
        PlayingInstance {
            read_ms,
            length_ms,
            paused,
            ..PlayingInstance::started(InstanceId::new(1), SoundId::new(1), length_ms)
        }
    }

    #[test]
    fn test_progress_midway() {
        assert_eq!(instance(500, 1000, false).progress_percent(), 50.0);
    }

    #[test]
    fn test_progress_clamped_to_100() {
        // A repeating instance can report a cursor past the length
        assert_eq!(instance(1500, 1000, false).progress_percent(), 100.0);
    }

    #[test]
    fn test_progress_zero_when_paused_or_unknown_length() {
        assert_eq!(instance(500, 1000, true).progress_percent(), 0.0);
        assert_eq!(instance(500, 0, false).progress_percent(), 0.0);
    }
}
