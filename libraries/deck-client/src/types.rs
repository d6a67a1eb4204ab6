//! Wire types for the backend API.
//!
//! The backend speaks camelCase JSON and is loose about id types (numeric
//! or string depending on the endpoint); everything here converts into the
//! canonical `deck-core` identity types at the boundary.

use deck_core::{InstanceId, Sound, SoundId, Tab, TabId};
use serde::Deserialize;

/// Tab or sound id as the backend sends it: number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    /// Numeric id
    Num(i64),
    /// String id
    Str(String),
}

impl From<RawId> for TabId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Num(n) => TabId::from(n),
            RawId::Str(s) => TabId::new(s),
        }
    }
}

/// A tab as returned by `GET /api/tabs`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TabDto {
    pub id: RawId,
    pub name: String,
}

impl From<TabDto> for Tab {
    fn from(dto: TabDto) -> Self {
        Tab::new(dto.id.into(), dto.name)
    }
}

/// A sound as returned by the collection endpoints.
///
/// `tabId` is only present on `GET /api/sounds/all`; the per-tab
/// endpoints imply the owning tab from the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SoundDto {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub tab_id: Option<RawId>,
}

impl SoundDto {
    /// Convert into a domain sound owned by `tab`.
    pub(crate) fn into_sound(self, tab: &TabId) -> Sound {
        Sound::new(SoundId::new(self.id), self.name, self.path, tab.clone())
    }

    /// Convert using the embedded tab id (the cross-tab endpoint).
    pub(crate) fn into_tagged_sound(self) -> Option<Sound> {
        let tab: TabId = self.tab_id.clone()?.into();
        Some(self.into_sound(&tab))
    }
}

/// Response from `POST /api/sounds/{id}/play`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    /// Whether the backend accepted the play request
    #[serde(default)]
    pub success: bool,

    /// Instance id assigned to this playback.
    ///
    /// Absent on a malformed response; callers must treat that the same
    /// as `success: false` and leave no tracking state behind.
    pub playing_id: Option<InstanceId>,

    /// Total sound length in milliseconds, 0 when the backend cannot tell
    #[serde(rename = "lengthInMs", default)]
    pub length_ms: u64,

    /// Sound display name
    pub name: Option<String>,
}

/// One active instance from `GET /api/sounds/progress`.
///
/// The snapshot is authoritative and complete, never a delta. Mutable
/// fields are optional on the wire; an absent field means "unchanged",
/// never "reset to zero".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProgress {
    /// Instance id
    pub id: InstanceId,

    /// The sound this instance is playing
    pub sound_id: SoundId,

    /// Playback cursor in milliseconds
    #[serde(rename = "readInMs")]
    pub read_ms: Option<u64>,

    /// Total length in milliseconds
    #[serde(rename = "lengthInMs")]
    pub length_ms: Option<u64>,

    /// Whether the instance is paused
    pub paused: Option<bool>,

    /// Whether the instance repeats
    pub repeat: Option<bool>,

    /// Sound display name
    pub name: Option<String>,
}
