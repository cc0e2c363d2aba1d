//! Provider types
//!
//! Data exchanged with embed and drag/drop providers.

use twitchwall::registry::Placement;
use twitchwall::resize::TileSize;

/// Options applied to every embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Embed width (CSS length, e.g. `100%`)
    pub width: String,
    /// Embed height (CSS length)
    pub height: String,
    /// Domains allowed to host the embed
    pub parent_domains: Vec<String>,
    pub muted: bool,
}

/// A created embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedHandle {
    /// Container the embed lives in (`twitch-embed-<channel>`)
    pub container_id: String,
    pub channel: String,
    /// Player URL the embed loads
    pub url: String,
}

/// A completed drag-and-drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderGesture {
    /// Tile that was dragged
    pub id: String,
    /// Where it was dropped
    pub placement: Placement,
}

/// A completed resize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeGesture {
    pub id: String,
    pub size: TileSize,
}
