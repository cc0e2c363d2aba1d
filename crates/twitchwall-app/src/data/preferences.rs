//! Layout preferences
//!
//! Hidden flags and the saved tile order, kept in an expiring key-value
//! store under fixed keys: `hidden_<tile id>` and `stream_order`.
//!
//! Writes are fire-and-forget: a storage failure is logged and otherwise
//! ignored. Missing, expired or malformed values read as defaults.

use crate::config::storage::{DEFAULT_TTL_SECS, HIDDEN_PREFIX, ORDER_KEY, PREFERENCES_FILE};
use crate::data::kv::KvStore;
use crate::data::storage;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use twitchwall::entry::{channel_of, tile_id};
use twitchwall::reconciler::SavedLayout;

/// Value stored under a hidden key
const HIDDEN_VALUE: &str = "true";

/// Persisted visibility and order preferences
pub struct PreferenceStore {
    kv: KvStore,
    ttl: Duration,
}

impl PreferenceStore {
    /// Wrap a key-value store with the default expiry
    pub fn new(kv: KvStore) -> Self {
        Self {
            kv,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }

    /// Preferences that live only as long as the process
    pub fn in_memory() -> Self {
        Self::new(KvStore::in_memory())
    }

    /// Open the preferences file in `dir` (or the default config directory)
    ///
    /// Never fails: an unreadable file starts over empty, and without a
    /// config directory preferences stay in memory.
    pub fn open(dir: Option<&Path>) -> Self {
        match storage::data_path(dir, PREFERENCES_FILE) {
            Ok(path) => Self::open_at(&path),
            Err(e) => {
                warn!("Preferences will not persist: {e}");
                Self::in_memory()
            }
        }
    }

    /// Open a specific preferences file
    pub fn open_at(path: &Path) -> Self {
        let kv = match KvStore::open(path) {
            Ok(kv) => kv,
            Err(e) => {
                warn!("Ignoring saved preferences: {e}");
                KvStore::empty_at(path)
            }
        };
        Self::new(kv)
    }

    /// Set how long written preferences stay valid
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Access the underlying key-value store
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Persist a hidden flag; unhiding removes the key
    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        let key = hidden_key(id);
        let result = if hidden {
            self.kv.set(&key, HIDDEN_VALUE, Some(self.ttl))
        } else {
            self.kv.remove(&key).map(|_| ())
        };
        match result {
            Ok(()) => debug!(key = %key, hidden, "Hidden flag saved"),
            Err(e) => warn!(key = %key, "Failed to save hidden flag: {e}"),
        }
    }

    /// Whether a tile is hidden; `false` if absent or expired
    pub fn is_hidden(&self, id: &str) -> bool {
        self.kv.get(&hidden_key(id)) == Some(HIDDEN_VALUE)
    }

    /// Tile ids of every live hidden flag
    pub fn hidden_ids(&self) -> BTreeSet<String> {
        self.kv
            .keys_with_prefix(HIDDEN_PREFIX)
            .filter(|key| self.kv.get(key) == Some(HIDDEN_VALUE))
            .filter_map(|key| key.strip_prefix(HIDDEN_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// Persist the full render order
    pub fn save_order<S: AsRef<str>>(&mut self, ids: &[S]) {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        let encoded = match serde_json::to_string(&ids) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode stream order: {e}");
                return;
            }
        };
        match self.kv.set(ORDER_KEY, &encoded, Some(self.ttl)) {
            Ok(()) => debug!(tiles = ids.len(), "Stream order saved"),
            Err(e) => warn!("Failed to save stream order: {e}"),
        }
    }

    /// Last saved order; empty if absent, expired or malformed
    pub fn load_order(&self) -> Vec<String> {
        let Some(raw) = self.kv.get(ORDER_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("Ignoring malformed stream order: {e}");
            Vec::new()
        })
    }

    /// Snapshot of everything the reconciler needs
    pub fn saved_layout(&self) -> SavedLayout {
        SavedLayout {
            hidden: self.hidden_ids(),
            order: self.load_order(),
        }
    }

    /// Forget the saved order and every hidden flag
    pub fn clear(&mut self) {
        if let Err(e) = self.kv.remove_prefix(HIDDEN_PREFIX) {
            warn!("Failed to clear hidden flags: {e}");
        }
        if let Err(e) = self.kv.remove(ORDER_KEY) {
            warn!("Failed to clear stream order: {e}");
        }
    }
}

/// Storage key of a tile's hidden flag, for an id in either form
fn hidden_key(id: &str) -> String {
    format!("{HIDDEN_PREFIX}{}", tile_id(channel_of(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::kv::ManualClock;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use twitchwall::reconciler::reconcile;

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        temp_dir().join(format!("twitchwall_prefs_test_{}_{}.json", std::process::id(), id))
    }

    fn store_with_clock() -> (PreferenceStore, ManualClock) {
        let clock = ManualClock::new(10_000);
        let store = PreferenceStore::new(KvStore::in_memory().with_clock(clock.clone()));
        (store, clock)
    }

    #[test]
    fn test_hidden_defaults_to_false() {
        let store = PreferenceStore::in_memory();
        assert!(!store.is_hidden("stream-div-a"));
        assert!(store.hidden_ids().is_empty());
    }

    #[test]
    fn test_set_hidden_uses_tile_key() {
        let mut store = PreferenceStore::in_memory();
        store.set_hidden("a", true);
        assert_eq!(store.kv().get("hidden_stream-div-a"), Some("true"));
        assert!(store.is_hidden("stream-div-a"));
        assert!(store.is_hidden("a"));
    }

    #[test]
    fn test_unhide_removes_key() {
        let mut store = PreferenceStore::in_memory();
        store.set_hidden("stream-div-a", true);
        store.set_hidden("stream-div-a", false);
        assert!(!store.is_hidden("stream-div-a"));
        assert!(store.kv().is_empty());
    }

    #[test]
    fn test_hidden_ids() {
        let mut store = PreferenceStore::in_memory();
        store.set_hidden("b", true);
        store.set_hidden("a", true);
        store.save_order(&["a", "b"]);
        let hidden: Vec<_> = store.hidden_ids().into_iter().collect();
        assert_eq!(hidden, ["stream-div-a", "stream-div-b"]);
    }

    #[test]
    fn test_hidden_flag_expires() {
        let (mut store, clock) = store_with_clock();
        store.set_hidden("a", true);
        clock.advance(Duration::from_secs(DEFAULT_TTL_SECS));
        assert!(!store.is_hidden("a"));
        assert!(store.hidden_ids().is_empty());
    }

    #[test]
    fn test_custom_ttl() {
        let (store, clock) = store_with_clock();
        let mut store = store.with_ttl(Duration::from_secs(60));
        store.save_order(&["stream-div-a"]);
        clock.advance(Duration::from_secs(59));
        assert_eq!(store.load_order(), ["stream-div-a"]);
        clock.advance(Duration::from_secs(1));
        assert!(store.load_order().is_empty());
    }

    #[test]
    fn test_order_round_trip() {
        let mut store = PreferenceStore::in_memory();
        assert!(store.load_order().is_empty());

        store.save_order(&["stream-div-c", "stream-div-a", "stream-div-b"]);
        let order = store.load_order();
        assert_eq!(order, ["stream-div-c", "stream-div-a", "stream-div-b"]);

        store.save_order(&order);
        assert_eq!(store.load_order(), order);
    }

    #[test]
    fn test_order_survives_reconcile_round_trip() {
        let mut store = PreferenceStore::in_memory();
        store.save_order(&["stream-div-b", "stream-div-a"]);

        let registry = reconcile(["a", "b"], &store.saved_layout());
        store.save_order(&registry.order());
        assert_eq!(store.load_order(), ["stream-div-b", "stream-div-a"]);
    }

    #[test]
    fn test_malformed_order_reads_empty() {
        let mut kv = KvStore::in_memory();
        kv.set(ORDER_KEY, "not json", None).unwrap();
        let store = PreferenceStore::new(kv);
        assert!(store.load_order().is_empty());
    }

    #[test]
    fn test_non_true_hidden_value_ignored() {
        let mut kv = KvStore::in_memory();
        kv.set("hidden_stream-div-a", "false", None).unwrap();
        let store = PreferenceStore::new(kv);
        assert!(!store.is_hidden("a"));
        assert!(store.hidden_ids().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut kv = KvStore::in_memory();
        kv.set("unrelated", "x", None).unwrap();
        let mut store = PreferenceStore::new(kv);
        store.set_hidden("a", true);
        store.save_order(&["stream-div-a"]);

        store.clear();
        assert!(store.saved_layout().is_empty());
        assert_eq!(store.kv().get("unrelated"), Some("x"));
    }

    #[test]
    fn test_persists_across_open() {
        let path = temp_path();
        {
            let mut store = PreferenceStore::open_at(&path);
            store.set_hidden("a", true);
            store.save_order(&["stream-div-b", "stream-div-a"]);
        }

        let store = PreferenceStore::open_at(&path);
        let layout = store.saved_layout();
        assert_eq!(layout.order, ["stream-div-b", "stream-div-a"]);
        assert!(layout.hidden.contains("stream-div-a"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path();
        fs::write(&path, "garbage").unwrap();

        let mut store = PreferenceStore::open_at(&path);
        assert!(store.saved_layout().is_empty());

        // First write replaces the corrupt file
        store.set_hidden("a", true);
        assert!(PreferenceStore::open_at(&path).is_hidden("a"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_failure_is_silent() {
        // A directory where the file should be makes every write fail
        let path = temp_path();
        fs::create_dir_all(&path).unwrap();

        let mut store = PreferenceStore::new(KvStore::empty_at(&path));
        store.set_hidden("a", true);
        store.save_order(&["stream-div-a"]);

        // Still readable for the rest of the session
        assert!(store.is_hidden("a"));
        assert_eq!(store.load_order(), ["stream-div-a"]);

        // Nothing landed on disk, not even the temp file
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(&path).unwrap().count(), 0);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());

        let _ = fs::remove_dir_all(&path);
    }
}
