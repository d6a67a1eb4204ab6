/// Layout mode types
use serde::{Deserialize, Serialize};

/// A named display arrangement for a tab.
///
/// Each mode carries its own independently persisted sound ordering per
/// tab, so reordering sounds in the list view does not disturb the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Regular button grid
    #[default]
    Grid,
    /// Denser grid with smaller cards
    #[serde(rename = "compact")]
    CompactGrid,
    /// Single-column list
    List,
}

impl LayoutMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::CompactGrid => "compact",
            Self::List => "list",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(Self::Grid),
            "compact" => Some(Self::CompactGrid),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
