//! Sounddeck Remote Settings
//!
//! Persistent storage for user customizations: per-sound color, emoji,
//! favorite and volume flags, per-tab-per-layout sound ordering, the last
//! active tab, and global UI toggles.
//!
//! Everything lives in one versioned JSON document under a single file.
//! The store is deliberately forgiving on the read side — an absent,
//! unreadable, corrupt, or version-mismatched file silently yields the
//! default document (there is no migration path) — and deliberately quiet
//! on the write side: save failures are logged, never surfaced to the
//! caller. Every field mutation persists immediately; there is no
//! batching or debounce.
//!
//! The store performs no change notification of its own. After
//! [`SettingsStore::import_settings`] or [`SettingsStore::reset`], callers
//! must re-derive any in-memory caches (sound lists, active tab) through
//! their own reload sequence.

#![forbid(unsafe_code)]

mod document;
mod store;

pub use document::{SettingsDocument, SoundSettings, TabLayout, SCHEMA_VERSION};
pub use store::{SettingsError, SettingsStore, EXPORT_ENVELOPE_KEY};
