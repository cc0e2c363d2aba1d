//! Configuration constants for twitchwall app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "twitchwall";
}

/// Persisted preference storage
pub mod storage {
    /// Key-value file holding hidden flags and the saved order
    pub const PREFERENCES_FILE: &str = "preferences.json";

    /// Settings file
    pub const SETTINGS_FILE: &str = "settings.json";

    /// Log file written while the terminal dashboard is open
    pub const LOG_FILE: &str = "twitchwall.log";

    /// Key prefix of per-tile hidden flags (`hidden_<tile id>`)
    pub const HIDDEN_PREFIX: &str = "hidden_";

    /// Key of the saved render order
    pub const ORDER_KEY: &str = "stream_order";

    /// Lifetime of saved preferences (one day)
    pub const DEFAULT_TTL_SECS: u64 = 86_400;
}

/// Streamer list sources
pub mod sources {
    /// Default streamer list location, relative to the working directory
    pub const DEFAULT_LIST: &str = "streamers.txt";
}

/// Twitch embed configuration
pub mod embed {
    /// Twitch player base URL
    pub const PLAYER_URL: &str = "https://player.twitch.tv/";

    /// Domains allowed to host the embed
    pub const PARENT_DOMAINS: &[&str] = &["wheaties466.github.io"];
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Twitchwall/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;
}
