//! File-backed settings store.

use crate::document::{SettingsDocument, SoundSettings, SCHEMA_VERSION};
use deck_core::{LayoutMode, TabId};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Envelope key wrapping the document in an exported settings file.
pub const EXPORT_ENVELOPE_KEY: &str = "sounddeckSettings";

/// Errors from settings import.
///
/// Loading and saving never error: a bad stored file yields defaults and
/// a failed write is logged. Import is the one operation where the user
/// handed us a file and deserves to know what was wrong with it.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The imported file is not the expected envelope shape
    #[error("Invalid settings file: {0}")]
    InvalidEnvelope(String),

    /// The imported document could not be deserialized
    #[error("Invalid settings document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// Result type for settings import operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Key-value style store over the single persisted settings document.
///
/// Every setter persists immediately. Reads are served from the in-memory
/// document, which is authoritative between loads.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    doc: SettingsDocument,
}

impl SettingsStore {
    /// Open the store at `path`, loading the existing document or falling
    /// back to defaults.
    ///
    /// An absent, unreadable, unparsable, or version-mismatched file all
    /// yield the default document; none of these is an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = Self::load_document(&path);
        Self { path, doc }
    }

    fn load_document(path: &Path) -> SettingsDocument {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No stored settings, using defaults");
                return SettingsDocument::default();
            }
        };

        match serde_json::from_str::<SettingsDocument>(&raw) {
            Ok(doc) if doc.version == SCHEMA_VERSION => doc,
            Ok(doc) => {
                debug!(
                    stored = doc.version,
                    current = SCHEMA_VERSION,
                    "Settings version mismatch, using defaults"
                );
                SettingsDocument::default()
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Corrupt settings, using defaults");
                SettingsDocument::default()
            }
        }
    }

    /// The current in-memory document.
    pub fn document(&self) -> &SettingsDocument {
        &self.doc
    }

    /// Persist the current document, stamping the current schema version.
    ///
    /// Write failures are logged and swallowed; a remote-control client
    /// must keep working with an unwritable disk.
    pub fn save(&mut self) {
        self.doc.version = SCHEMA_VERSION;
        self.write_document();
    }

    fn write_document(&self) {
        if let Err(e) = self.try_write() {
            warn!(path = %self.path.display(), error = %e, "Failed to persist settings");
        }
    }

    fn try_write(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.doc).map_err(std::io::Error::other)?;
        // Write-then-rename so a crash mid-write cannot corrupt the document
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }

    // ========================================================================
    // Per-sound customization (keyed by path, the stable identity)
    // ========================================================================

    /// Customization for a sound, default when none is stored.
    pub fn sound_settings(&self, path: &str) -> SoundSettings {
        self.doc.sound_settings.get(path).cloned().unwrap_or_default()
    }

    /// Set the card color for a sound.
    pub fn set_sound_color(&mut self, path: &str, color: Option<String>) {
        self.update_sound(path, |s| s.color = color);
    }

    /// Set the emoji for a sound.
    pub fn set_sound_emoji(&mut self, path: &str, emoji: Option<String>) {
        self.update_sound(path, |s| s.emoji = emoji);
    }

    /// Set or clear the favorite flag for a sound.
    pub fn set_favorite(&mut self, path: &str, favorite: bool) {
        self.update_sound(path, |s| s.favorite = favorite);
    }

    /// Whether a sound is marked favorite.
    pub fn is_favorite(&self, path: &str) -> bool {
        self.doc
            .sound_settings
            .get(path)
            .is_some_and(|s| s.favorite)
    }

    /// Record whether a sound carries a custom volume on the backend.
    pub fn set_has_custom_volume(&mut self, path: &str, has_custom_volume: bool) {
        self.update_sound(path, |s| s.has_custom_volume = has_custom_volume);
    }

    fn update_sound(&mut self, path: &str, mutate: impl FnOnce(&mut SoundSettings)) {
        let entry = self.doc.sound_settings.entry(path.to_string()).or_default();
        mutate(entry);
        if entry.is_default() {
            self.doc.sound_settings.remove(path);
        }
        self.save();
    }

    // ========================================================================
    // Tab layout state
    // ========================================================================

    /// Persisted sound order (by path) for a tab and layout mode.
    pub fn tab_order(&self, tab: &TabId, layout: LayoutMode) -> Option<Vec<String>> {
        self.doc
            .tab_layouts
            .get(tab)
            .and_then(|l| l.orders.get(&layout))
            .cloned()
    }

    /// Store a customized sound order for a tab and layout mode.
    pub fn set_tab_order(&mut self, tab: &TabId, layout: LayoutMode, order: Vec<String>) {
        self.doc
            .tab_layouts
            .entry(tab.clone())
            .or_default()
            .orders
            .insert(layout, order);
        self.save();
    }

    /// Active layout mode for a tab.
    pub fn current_layout(&self, tab: &TabId) -> LayoutMode {
        self.doc
            .tab_layouts
            .get(tab)
            .map(|l| l.current_layout)
            .unwrap_or_default()
    }

    /// Switch the active layout mode for a tab.
    pub fn set_current_layout(&mut self, tab: &TabId, layout: LayoutMode) {
        self.doc
            .tab_layouts
            .entry(tab.clone())
            .or_default()
            .current_layout = layout;
        self.save();
    }

    // ========================================================================
    // Global state
    // ========================================================================

    /// Tab to restore on startup, if one was recorded.
    pub fn last_tab(&self) -> Option<TabId> {
        self.doc.last_tab_id.clone()
    }

    /// Record the active tab.
    pub fn set_last_tab(&mut self, tab: &TabId) {
        self.doc.last_tab_id = Some(tab.clone());
        self.save();
    }

    /// Whether the app should enter fullscreen automatically.
    pub fn auto_fullscreen_enabled(&self) -> bool {
        self.doc.auto_fullscreen_enabled
    }

    /// Toggle automatic fullscreen.
    pub fn set_auto_fullscreen_enabled(&mut self, enabled: bool) {
        self.doc.auto_fullscreen_enabled = enabled;
        self.save();
    }

    /// Whether the stop/settings buttons are swapped.
    pub fn swap_button_position(&self) -> bool {
        self.doc.swap_button_position
    }

    /// Toggle the stop/settings button swap.
    pub fn set_swap_button_position(&mut self, swapped: bool) {
        self.doc.swap_button_position = swapped;
        self.save();
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    /// Serialize the full document under the export envelope.
    pub fn export_settings(&self) -> String {
        let envelope = serde_json::json!({ EXPORT_ENVELOPE_KEY: self.doc });
        // Document serialization cannot fail: all values are plain data
        serde_json::to_string_pretty(&envelope).unwrap_or_default()
    }

    /// Replace the document with an imported one.
    ///
    /// Expects the exact export envelope: a JSON object whose
    /// `sounddeckSettings` key holds a document with a numeric `version`
    /// field. On success the in-memory and persisted document are fully
    /// replaced — no merge. Callers must re-derive dependent caches
    /// afterwards; the store does not notify.
    pub fn import_settings(&mut self, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SettingsError::InvalidEnvelope(format!("not valid JSON: {e}")))?;

        let Some(nested) = value.get(EXPORT_ENVELOPE_KEY) else {
            return Err(SettingsError::InvalidEnvelope(format!(
                "missing \"{EXPORT_ENVELOPE_KEY}\" key"
            )));
        };
        if !nested.is_object() {
            return Err(SettingsError::InvalidEnvelope(format!(
                "\"{EXPORT_ENVELOPE_KEY}\" is not an object"
            )));
        }
        if !nested.get("version").is_some_and(Value::is_u64) {
            return Err(SettingsError::InvalidEnvelope(
                "document has no numeric \"version\" field".to_string(),
            ));
        }

        self.doc = serde_json::from_value(nested.clone())?;
        // Written verbatim: stamping would silently rewrite the imported
        // version and change what the next load sees
        self.write_document();
        Ok(())
    }

    /// Discard everything and persist the default document.
    pub fn reset(&mut self) {
        self.doc = SettingsDocument::default();
        self.save();
    }
}
