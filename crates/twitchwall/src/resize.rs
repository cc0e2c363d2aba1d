//! Tile resize math
//!
//! The resize gesture itself belongs to the frontend. This module only
//! computes the resulting tile and embed dimensions.

use serde::{Deserialize, Serialize};

use crate::config::layout::{MIN_TILE_HEIGHT, MIN_TILE_WIDTH};

/// Width and height of a tile or embed, in frontend units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Smallest allowed tile
    pub const MIN: TileSize = TileSize::new(MIN_TILE_WIDTH, MIN_TILE_HEIGHT);

    /// This size raised to the minimum tile size
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_TILE_WIDTH),
            height: self.height.max(MIN_TILE_HEIGHT),
        }
    }
}

/// Fixed-height parts of a tile around the embed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileChrome {
    /// Header row (streamer name)
    pub header_height: u32,
    /// Control row (hide button)
    pub controls_height: u32,
}

impl TileChrome {
    pub const fn new(header_height: u32, controls_height: u32) -> Self {
        Self {
            header_height,
            controls_height,
        }
    }

    fn total(&self) -> u32 {
        self.header_height.saturating_add(self.controls_height)
    }
}

/// Embed dimensions for a tile resized to `tile`
///
/// The embed takes the full tile width and whatever height remains below
/// the header and above the controls.
pub fn embed_size(tile: TileSize, chrome: TileChrome) -> TileSize {
    let tile = tile.clamped();
    TileSize {
        width: tile.width,
        height: tile.height.saturating_sub(chrome.total()),
    }
}
