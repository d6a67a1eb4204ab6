//! The persisted settings document.

use deck_core::{LayoutMode, TabId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current schema version.
///
/// A stored document whose `version` differs is discarded wholesale and
/// replaced with defaults; there is no migration path.
pub const SCHEMA_VERSION: u32 = 2;

/// Per-sound visual and behavioral customization, keyed by sound path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    /// Card accent color (CSS color string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Emoji shown on the card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Whether the sound is pinned to the favorites tab
    pub favorite: bool,

    /// Whether the sound carries a custom per-sound volume on the backend
    pub has_custom_volume: bool,
}

impl SoundSettings {
    /// True when every field is at its default, meaning the entry can be
    /// dropped from the document instead of stored.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-tab layout state: the active layout mode plus one persisted sound
/// order (by path) for each layout mode the user has customized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabLayout {
    /// Layout mode currently active for this tab
    pub current_layout: LayoutMode,

    /// Customized sound order per layout mode.
    ///
    /// Order lists are advisory: paths no longer present in the live
    /// collection are skipped at display time but kept here, and live
    /// sounds missing from the list are appended in server order.
    pub orders: HashMap<LayoutMode, Vec<String>>,
}

/// The versioned settings document, one per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDocument {
    /// Schema version; must equal [`SCHEMA_VERSION`] to be loaded
    pub version: u32,

    /// Customization per sound, keyed by path
    pub sound_settings: HashMap<String, SoundSettings>,

    /// Layout state per tab
    pub tab_layouts: HashMap<TabId, TabLayout>,

    /// Tab to restore on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tab_id: Option<TabId>,

    /// Enter fullscreen automatically when the app connects
    pub auto_fullscreen_enabled: bool,

    /// Swap the stop/settings button positions for left-handed use
    pub swap_button_position: bool,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            sound_settings: HashMap::new(),
            tab_layouts: HashMap::new(),
            last_tab_id: None,
            auto_fullscreen_enabled: false,
            swap_button_position: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_has_current_version() {
        assert_eq!(SettingsDocument::default().version, SCHEMA_VERSION);
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let mut doc = SettingsDocument::default();
        doc.sound_settings.insert(
            "/sounds/airhorn.mp3".to_string(),
            SoundSettings {
                color: Some("#ff0000".to_string()),
                emoji: Some("📯".to_string()),
                favorite: true,
                has_custom_volume: false,
            },
        );
        let mut layout = TabLayout::default();
        layout.orders.insert(
            LayoutMode::Grid,
            vec!["/sounds/b.mp3".to_string(), "/sounds/a.mp3".to_string()],
        );
        doc.tab_layouts.insert(TabId::new("3"), layout);
        doc.last_tab_id = Some(TabId::favorites());

        let json = serde_json::to_string(&doc).unwrap();
        let back: SettingsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let doc: SettingsDocument = serde_json::from_str(
            r#"{"version": 2, "somethingNew": true, "soundSettings": {}}"#,
        )
        .unwrap();
        assert_eq!(doc.version, SCHEMA_VERSION);
    }
}
