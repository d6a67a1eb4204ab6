/// Tab domain type
use crate::types::TabId;
use serde::{Deserialize, Serialize};

/// Display name of the synthetic favorites tab
pub const FAVORITES_TAB_NAME: &str = "Favorites";

/// A tab of sounds as shown in the remote UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Canonical tab identifier
    pub id: TabId,

    /// Tab display name
    pub name: String,
}

impl Tab {
    /// Create a tab
    pub fn new(id: TabId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The synthetic favorites pseudo-tab.
    ///
    /// Synthesized by the client as the first tab; the backend never
    /// reports it.
    pub fn favorites() -> Self {
        Self {
            id: TabId::favorites(),
            name: FAVORITES_TAB_NAME.to_string(),
        }
    }
}
