//! Sounddeck Remote Core
//!
//! Shared domain types for the Sounddeck remote-control client.
//!
//! This crate defines the canonical identity types and the entities the
//! rest of the workspace operates on:
//! - **Identity**: [`TabId`] (string), [`SoundId`] and [`InstanceId`]
//!   (integers). Every boundary converts into these exactly once at
//!   ingress; nothing downstream compares loosely-typed ids.
//! - **Entities**: [`Tab`], [`Sound`], [`PlayingInstance`].
//! - **Layout**: [`LayoutMode`], the named display arrangements that each
//!   carry an independently persisted sound ordering per tab.
//!
//! # Example
//!
//! ```rust
//! use deck_core::{PlayingInstance, SoundId, InstanceId};
//!
//! let instance = PlayingInstance::started(InstanceId::new(7), SoundId::new(42), 1000);
//! assert_eq!(instance.progress_percent(), 0.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

// Re-export commonly used types
pub use types::{
    InstanceId, LayoutMode, PlayingInstance, Sound, SoundId, Tab, TabId, FAVORITES_TAB_NAME,
};
