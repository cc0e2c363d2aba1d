//! Data persistence
//!
//! Handles layout preferences, settings and the storage underneath them.

pub mod kv;
pub mod preferences;
pub mod settings;
pub mod storage;

// Re-export common types
pub use kv::{Clock, KvStore, ManualClock, SystemClock};
pub use preferences::PreferenceStore;
pub use settings::Settings;
