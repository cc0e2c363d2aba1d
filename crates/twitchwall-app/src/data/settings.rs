//! Application settings
//!
//! Where the streamer list comes from, how embeds are configured and how
//! long layout preferences are kept.

use crate::config::embed::PARENT_DOMAINS;
use crate::config::sources::DEFAULT_LIST;
use crate::config::storage::{DEFAULT_TTL_SECS, SETTINGS_FILE};
use crate::data::storage;
use crate::error::Result;
use crate::providers::types::EmbedOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings file format version for migrations
const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// File format version
    #[serde(default = "default_version")]
    pub version: u32,

    // === Sources ===
    /// Streamer list location: a file path or an http(s) URL
    #[serde(default = "default_streamers")]
    pub streamers: String,

    // === Embeds ===
    /// Domains allowed to host the Twitch embed
    #[serde(default = "default_parent_domains")]
    pub parent_domains: Vec<String>,

    /// Embed width (CSS length)
    #[serde(default = "default_embed_dimension")]
    pub embed_width: String,

    /// Embed height (CSS length)
    #[serde(default = "default_embed_dimension")]
    pub embed_height: String,

    /// Start embeds muted
    #[serde(default)]
    pub muted: bool,

    // === Preferences ===
    /// How long hidden flags and the saved order stay valid, in seconds
    #[serde(default = "default_ttl")]
    pub preference_ttl_secs: u64,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_streamers() -> String {
    DEFAULT_LIST.to_string()
}

fn default_parent_domains() -> Vec<String> {
    PARENT_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_embed_dimension() -> String {
    "100%".to_string()
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            streamers: default_streamers(),
            parent_domains: default_parent_domains(),
            embed_width: default_embed_dimension(),
            embed_height: default_embed_dimension(),
            muted: false,
            preference_ttl_secs: default_ttl(),
        }
    }
}

impl Settings {
    /// Load settings from `dir` (or the default config directory)
    ///
    /// A missing file gives the defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        Self::load_from(&storage::data_path(dir, SETTINGS_FILE)?)
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(storage::load_from::<Settings>(path)?.unwrap_or_default())
    }

    /// Save settings to `dir` (or the default config directory)
    pub fn save(&self, dir: Option<&Path>) -> Result<()> {
        self.save_to(&storage::data_path(dir, SETTINGS_FILE)?)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        storage::save_to(path, self)
    }

    pub fn preference_ttl(&self) -> Duration {
        Duration::from_secs(self.preference_ttl_secs)
    }

    /// Options passed to the embed provider for every tile
    pub fn embed_options(&self) -> EmbedOptions {
        EmbedOptions {
            width: self.embed_width.clone(),
            height: self.embed_height.clone(),
            parent_domains: self.parent_domains.clone(),
            muted: self.muted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        temp_dir().join(format!("twitchwall_settings_test_{}_{}.json", std::process::id(), id))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.streamers, "streamers.txt");
        assert_eq!(settings.parent_domains, ["wheaties466.github.io"]);
        assert_eq!(settings.preference_ttl(), Duration::from_secs(86_400));
        assert!(!settings.muted);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load_from(&temp_path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path();
        fs::write(&path, r#"{ "streamers": "https://example.com/list.txt", "muted": true }"#)
            .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.streamers, "https://example.com/list.txt");
        assert!(settings.muted);
        assert_eq!(settings.embed_width, "100%");
        assert_eq!(settings.preference_ttl_secs, 86_400);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path();
        let settings = Settings {
            parent_domains: vec!["localhost".to_string()],
            preference_ttl_secs: 3600,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_in_dir() {
        let dir = temp_path().with_extension("d");
        let settings = Settings {
            streamers: "https://example.com/list.txt".to_string(),
            ..Settings::default()
        };
        // Missing dir is created on save
        settings.save(Some(&dir)).unwrap();
        assert!(dir.join(SETTINGS_FILE).exists());
        assert_eq!(Settings::load(Some(&dir)).unwrap(), settings);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_embed_options() {
        let settings = Settings {
            embed_height: "480".to_string(),
            muted: true,
            ..Settings::default()
        };
        let options = settings.embed_options();
        assert_eq!(options.width, "100%");
        assert_eq!(options.height, "480");
        assert!(options.muted);
        assert_eq!(options.parent_domains, settings.parent_domains);
    }
}
