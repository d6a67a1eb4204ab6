//! Tab activation and display-order merging.

use deck_core::{Sound, Tab, TabId};
use tracing::warn;

/// Pick the tab to activate on startup.
///
/// A persisted last-active tab is honored only if it still exists in the
/// live collection (compared as canonical ids); anything else falls back
/// to favorites.
pub(crate) fn resolve_startup_tab(tabs: &[Tab], persisted: Option<TabId>) -> TabId {
    match persisted {
        Some(last) if tabs.iter().any(|t| t.id == last) => last,
        _ => TabId::favorites(),
    }
}

/// Merge a live sound collection with a persisted display order.
///
/// Sounds whose paths appear in the persisted order come first, in that
/// order; persisted paths with no live counterpart are skipped (and kept
/// in storage — the order list is advisory); live sounds the order does
/// not mention are appended afterwards, preserving server order among
/// the newcomers. Without a persisted order the server order is used
/// verbatim.
pub(crate) fn merge_with_persisted_order(
    live: Vec<Sound>,
    persisted: Option<&[String]>,
) -> Vec<Sound> {
    let Some(order) = persisted else {
        return live;
    };

    let mut remaining: Vec<Option<Sound>> = live.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(remaining.len());

    for path in order {
        let found = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|s| s.path == *path));
        match found {
            Some(slot) => {
                if let Some(sound) = slot.take() {
                    merged.push(sound);
                }
            }
            None => {
                warn!(path = %path, "Persisted order references a sound no longer on the server");
            }
        }
    }

    merged.extend(remaining.into_iter().flatten());
    merged
}
