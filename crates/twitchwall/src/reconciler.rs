//! Layout reconciliation
//!
//! Merges the streamer list read at startup with the saved layout
//! (custom order and hidden set) to produce the authoritative registry.
//!
//! Order of operations:
//! 1. build entries in discovery order, all visible
//! 2. move ids from the saved order to the front, in saved sequence
//! 3. mark ids from the hidden set invisible
//!
//! Saved ids that are no longer in the list are dropped silently. Streamers
//! never seen before end up after every ordered id, in first-seen order.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::entry::channel_of;
use crate::registry::StreamRegistry;

/// Persisted layout preferences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedLayout {
    /// Tile ids the user chose not to display
    pub hidden: BTreeSet<String>,
    /// Saved render order of tile ids
    pub order: Vec<String>,
}

impl SavedLayout {
    pub fn new<H, O, S, T>(hidden: H, order: O) -> Self
    where
        H: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            hidden: hidden.into_iter().map(Into::into).collect(),
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    /// Nothing saved (or everything expired)
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty() && self.order.is_empty()
    }
}

/// Split a newline-separated streamer list into names
///
/// Lines are trimmed, blank lines dropped, and a repeated name keeps only
/// its first occurrence.
pub fn parse_streamer_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(channel_of)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Build the registry for `names` with `saved` preferences applied
pub fn reconcile<I, S>(names: I, saved: &SavedLayout) -> StreamRegistry
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = StreamRegistry::from_names(names);
    registry.move_to_front(&saved.order);

    let mut hidden = 0;
    for id in &saved.hidden {
        if registry.hide(id) {
            hidden += 1;
        }
    }

    debug!(
        tiles = registry.len(),
        saved_order = saved.order.len(),
        hidden,
        "Layout reconciled"
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_flags(registry: &StreamRegistry) -> Vec<bool> {
        registry.entries().iter().map(|e| e.is_visible()).collect()
    }

    #[test]
    fn test_no_saved_state() {
        let registry = reconcile(["a", "b", "c"], &SavedLayout::default());
        assert_eq!(registry.channels(), ["a", "b", "c"]);
        assert_eq!(visible_flags(&registry), [true, true, true]);
    }

    #[test]
    fn test_saved_order_first_then_new() {
        let saved = SavedLayout::new(Vec::<String>::new(), ["c", "a"]);
        let registry = reconcile(["a", "b", "c"], &saved);
        assert_eq!(registry.channels(), ["c", "a", "b"]);
    }

    #[test]
    fn test_saved_order_in_tile_form() {
        let saved = SavedLayout::new(Vec::<String>::new(), ["stream-div-c", "stream-div-a"]);
        let registry = reconcile(["a", "b", "c"], &saved);
        assert_eq!(registry.order(), ["stream-div-c", "stream-div-a", "stream-div-b"]);
    }

    #[test]
    fn test_hidden_set_applied() {
        let saved = SavedLayout::new(["stream-div-a"], Vec::<String>::new());
        let registry = reconcile(["a", "b"], &saved);
        assert_eq!(registry.channels(), ["a", "b"]);
        assert_eq!(visible_flags(&registry), [false, true]);
    }

    #[test]
    fn test_unknown_saved_ids_dropped() {
        let saved = SavedLayout::new(["stream-div-gone"], ["gone", "b", "also-gone"]);
        let registry = reconcile(["a", "b"], &saved);
        assert_eq!(registry.channels(), ["b", "a"]);
        assert!(registry.hidden_ids().is_empty());
    }

    #[test]
    fn test_new_streamers_keep_first_seen_order() {
        let saved = SavedLayout::new(Vec::<String>::new(), ["b"]);
        let registry = reconcile(["x", "b", "y", "z"], &saved);
        assert_eq!(registry.channels(), ["b", "x", "y", "z"]);
    }

    #[test]
    fn test_reconcile_is_stable() {
        let saved = SavedLayout::new(["stream-div-b"], ["c", "a"]);
        let names = ["a", "b", "c", "d"];
        let first = reconcile(names, &saved);
        let second = reconcile(names, &saved);
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_round_trip() {
        let saved = SavedLayout::new(Vec::<String>::new(), ["stream-div-b", "stream-div-c", "stream-div-a"]);
        let registry = reconcile(["a", "b", "c"], &saved);
        assert_eq!(registry.order(), saved.order);
    }

    #[test]
    fn test_parse_streamer_list() {
        let names = parse_streamer_list("a\n\nb\r\n  c  \n\na\n");
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_streamer_list("").is_empty());
        assert!(parse_streamer_list("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_saved_layout_is_empty() {
        assert!(SavedLayout::default().is_empty());
        assert!(!SavedLayout::new(["x"], Vec::<String>::new()).is_empty());
    }
}
