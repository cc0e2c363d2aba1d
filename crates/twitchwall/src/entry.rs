//! Stream tile entries
//!
//! A [`StreamEntry`] is one streamer's tile on the dashboard. Its id is
//! derived from the channel name, so the same streamer always maps to the
//! same tile across sessions.

use serde::{Deserialize, Serialize};

use crate::config::tile::{EMBED_ID_PREFIX, TILE_ID_PREFIX};
use crate::resize::TileSize;

// =============================================================================
// Helper functions
// =============================================================================

/// Tile id for a channel (`stream-div-<channel>`)
pub fn tile_id(channel: &str) -> String {
    format!("{TILE_ID_PREFIX}{channel}")
}

/// Embed container id for a channel (`twitch-embed-<channel>`)
pub fn embed_id(channel: &str) -> String {
    format!("{EMBED_ID_PREFIX}{channel}")
}

/// Channel name referenced by an id
///
/// Accepts both the tile form (`stream-div-a`) and the bare channel (`a`).
pub fn channel_of(id: &str) -> &str {
    let id = id.trim();
    id.strip_prefix(TILE_ID_PREFIX).unwrap_or(id)
}

// =============================================================================
// StreamEntry
// =============================================================================

/// Display state of a tile
///
/// Every tile is in exactly one of these states. Transitions happen only
/// through hide/unhide commands or the initial reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// One streamer's tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    /// Tile id (`stream-div-<channel>`)
    pub id: String,
    /// Streamer / channel name
    pub channel: String,
    pub visibility: Visibility,
    /// 0-based render position, dense across the registry
    pub position: usize,
    /// Size set by a resize gesture; `None` means the grid default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TileSize>,
}

impl StreamEntry {
    /// Create a visible entry for a channel at a position
    pub fn new(channel: impl Into<String>, position: usize) -> Self {
        let channel = channel.into();
        Self {
            id: tile_id(&channel),
            channel,
            visibility: Visibility::Visible,
            position,
            size: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Embed container id inside this tile
    pub fn embed_id(&self) -> String {
        embed_id(&self.channel)
    }

    /// Whether `id` (tile or channel form) refers to this entry
    pub fn matches(&self, id: &str) -> bool {
        self.channel == channel_of(id)
    }
}
