/// ID types for Sounddeck entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tab identifier.
///
/// The backend reports tab ids as numbers or strings depending on the
/// endpoint; this type is the single canonical form. All lookups and
/// equality checks go through it, never through loose values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// Create a tab ID from any string-ish value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The synthetic favorites pseudo-tab.
    ///
    /// Always present as the first tab and never returned by the backend
    /// tab list.
    pub fn favorites() -> Self {
        Self("favorites".to_string())
    }

    /// Whether this is the favorites pseudo-tab
    pub fn is_favorites(&self) -> bool {
        self.0 == "favorites"
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TabId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Sound identifier.
///
/// Stable within a backend session only; never use it as a persistence
/// key (that is what `Sound::path` is for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(i64);

impl SoundId {
    /// Create a sound ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playing-instance identifier, assigned by the backend per play call.
///
/// Distinct from [`SoundId`]: one sound may be played many times, each
/// play producing a fresh instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(i64);

impl InstanceId {
    /// Create an instance ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
