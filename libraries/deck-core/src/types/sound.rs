/// Sound domain type
use crate::types::{SoundId, TabId};
use serde::{Deserialize, Serialize};

/// A playable sound button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    /// Backend-assigned id, stable within a session only
    pub id: SoundId,

    /// Display name
    pub name: String,

    /// Filesystem path on the backend host.
    ///
    /// The only identity that is stable across backend restarts; all
    /// persisted customization (color, emoji, favorite flag, ordering)
    /// keys on this, never on `id`.
    pub path: String,

    /// Owning tab (or the favorites pseudo-tab)
    pub tab_id: TabId,
}

impl Sound {
    /// Create a sound
    pub fn new(id: SoundId, name: impl Into<String>, path: impl Into<String>, tab_id: TabId) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            tab_id,
        }
    }
}
