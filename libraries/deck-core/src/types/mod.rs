//! Domain types for the Sounddeck remote client.

mod ids;
mod instance;
mod layout;
mod sound;
mod tab;

pub use ids::{InstanceId, SoundId, TabId};
pub use instance::PlayingInstance;
pub use layout::LayoutMode;
pub use sound::Sound;
pub use tab::{Tab, FAVORITES_TAB_NAME};
