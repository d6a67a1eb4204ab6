//! Fuzzy search over the full cross-tab sound collection.

use deck_core::Sound;
use strsim::normalized_levenshtein;
use tracing::debug;

/// Minimum normalized similarity for a fuzzy match
const FUZZY_THRESHOLD: f64 = 0.6;

/// In-memory fuzzy index over every sound across every tab.
///
/// Built once per session from the cross-tab listing and queried on each
/// keystroke. Substring matches rank above fuzzy matches; within each
/// class, higher similarity wins.
#[derive(Debug)]
pub struct SearchIndex {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    sound: Sound,
    normalized_name: String,
}

impl SearchIndex {
    /// Build the index from the full sound collection.
    pub fn build(sounds: Vec<Sound>) -> Self {
        let entries = sounds
            .into_iter()
            .map(|sound| Entry {
                normalized_name: normalize(&sound.name),
                sound,
            })
            .collect();
        Self { entries }
    }

    /// Number of indexed sounds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Query the index.
    ///
    /// An empty (or whitespace-only) term means "no active search" and
    /// returns `None` so the caller restores the plain tab view instead
    /// of showing an empty result set.
    pub fn search(&self, term: &str) -> Option<Vec<Sound>> {
        let needle = normalize(term);
        if needle.is_empty() {
            return None;
        }

        let mut scored: Vec<(f64, &Sound)> = self
            .entries
            .iter()
            .filter_map(|entry| score(&entry.normalized_name, &needle).map(|s| (s, &entry.sound)))
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        Some(scored.into_iter().map(|(_, s)| s.clone()).collect())
    }
}

/// Score a candidate against the needle, `None` when it does not match.
///
/// Substring hits score in [1, 2] (earlier match position is better);
/// fuzzy hits score in [0.6, 1). Fuzzy similarity is taken against the
/// whole name and against each word of it, whichever is closer, so a
/// typo in one word of a long name still matches.
fn score(candidate: &str, needle: &str) -> Option<f64> {
    if let Some(position) = candidate.find(needle) {
        let position_penalty = position as f64 / (candidate.len().max(1)) as f64;
        return Some(2.0 - position_penalty);
    }

    let similarity = candidate
        .split(' ')
        .map(|word| normalized_levenshtein(word, needle))
        .fold(normalized_levenshtein(candidate, needle), f64::max);
    (similarity >= FUZZY_THRESHOLD).then_some(similarity)
}

/// Lowercase and collapse runs of whitespace.
fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Query helper for the session: logs and returns nothing when the index
/// has not been built yet.
pub(crate) fn query(index: Option<&SearchIndex>, term: &str) -> Option<Vec<Sound>> {
    match index {
        Some(index) => index.search(term),
        None => {
            if term.trim().is_empty() {
                return None;
            }
            debug!("Search queried before the index was built");
            Some(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{SoundId, TabId};

    fn index() -> SearchIndex {
        let tab = TabId::new("1");
        SearchIndex::build(vec![
            Sound::new(SoundId::new(1), "Airhorn", "/sounds/airhorn.mp3", tab.clone()),
            Sound::new(SoundId::new(2), "Sad Trombone", "/sounds/trombone.mp3", tab.clone()),
            Sound::new(SoundId::new(3), "Air Raid Siren", "/sounds/siren.mp3", tab),
        ])
    }

    #[test]
    fn test_empty_term_means_no_active_search() {
        assert!(index().search("").is_none());
        assert!(index().search("   ").is_none());
    }

    #[test]
    fn test_substring_matches_rank_first() {
        let results = index().search("air").unwrap();
        assert_eq!(results.len(), 2);
        // Both start with "air"; ties break alphabetically
        assert_eq!(results[0].name, "Air Raid Siren");
        assert_eq!(results[1].name, "Airhorn");
    }

    #[test]
    fn test_fuzzy_match_tolerates_typos() {
        let results = index().search("tromboen").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Sad Trombone");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let results = index().search("AIRHORN").unwrap();
        assert_eq!(results[0].name, "Airhorn");
    }

    #[test]
    fn test_unrelated_term_yields_empty_results() {
        let results = index().search("zzzzzz").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_query_before_build_is_a_noop() {
        assert_eq!(query(None, "air"), Some(Vec::new()));
        assert!(query(None, "").is_none());
    }
}
