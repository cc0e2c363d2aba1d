//! Expiring key-value store
//!
//! Small string key-value pairs with an optional expiry, written through to
//! a JSON file on every mutation. Expired entries read as absent and are
//! dropped from the file on the next write.

use crate::data::storage;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Key-value file format version for migrations
const KV_VERSION: u32 = 1;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time in Unix seconds
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(now_secs: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now_secs)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// KvStore
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KvEntry {
    value: String,
    /// Unix seconds after which the entry is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

impl KvEntry {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct KvFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, KvEntry>,
}

/// Persistent string key-value store with per-key expiry
pub struct KvStore {
    entries: BTreeMap<String, KvEntry>,
    /// Backing file; `None` keeps everything in memory
    path: Option<PathBuf>,
    clock: Box<dyn Clock>,
}

impl KvStore {
    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            path: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Empty store backed by `path`; the first write replaces the file
    pub fn empty_at(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..Self::in_memory()
        }
    }

    /// Load the store from `path`
    ///
    /// A missing or empty file gives an empty store. A file that can't be
    /// read or parsed is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let mut store = Self::empty_at(path);
        if let Some(file) = storage::load_from::<KvFile>(path)? {
            store.entries = file.entries;
        }
        Ok(store)
    }

    /// Replace the clock (tests use [`ManualClock`])
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Value for `key`, `None` if absent or expired
    pub fn get(&self, key: &str) -> Option<&str> {
        let now = self.clock.now_secs();
        self.entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.as_str())
    }

    /// Set `key`, expiring after `ttl` (never, if `None`)
    pub fn set(&mut self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| self.clock.now_secs().saturating_add(ttl.as_secs()));
        self.entries.insert(
            key.to_string(),
            KvEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        self.flush()
    }

    /// Remove `key`. Returns whether a live entry was removed.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let now = self.clock.now_secs();
        match self.entries.remove(key) {
            Some(entry) => {
                self.flush()?;
                Ok(entry.is_live(now))
            }
            None => Ok(false),
        }
    }

    /// Remove every key starting with `prefix`, returning how many live ones went
    pub fn remove_prefix(&mut self, prefix: &str) -> Result<usize> {
        let now = self.clock.now_secs();
        let before = self.entries.len();
        let mut live = 0;
        self.entries.retain(|key, entry| {
            let matched = key.starts_with(prefix);
            if matched && entry.is_live(now) {
                live += 1;
            }
            !matched
        });
        if self.entries.len() != before {
            self.flush()?;
        }
        Ok(live)
    }

    /// Live keys starting with `prefix`, in key order
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let now = self.clock.now_secs();
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
            .filter(move |(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.as_str())
    }

    /// Drop expired entries from memory and disk. Returns how many went.
    pub fn purge_expired(&mut self) -> Result<usize> {
        let now = self.clock.now_secs();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let purged = before - self.entries.len();
        if purged > 0 {
            self.flush()?;
        }
        Ok(purged)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.now_secs();
        self.entries.values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flush(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let now = self.clock.now_secs();
        self.entries.retain(|_, entry| entry.is_live(now));
        let file = KvFile {
            version: KV_VERSION,
            entries: self.entries.clone(),
        };
        storage::save_to(path, &file)
    }
}
