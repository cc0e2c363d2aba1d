//! Configuration constants for the layout engine

/// Tile naming conventions
pub mod tile {
    /// Prefix of a stream tile id (`stream-div-<channel>`)
    pub const TILE_ID_PREFIX: &str = "stream-div-";

    /// Prefix of the embed container id inside a tile (`twitch-embed-<channel>`)
    pub const EMBED_ID_PREFIX: &str = "twitch-embed-";
}

/// Tile geometry
pub mod layout {
    /// Smallest width a tile can be resized to
    pub const MIN_TILE_WIDTH: u32 = 300;

    /// Smallest height a tile can be resized to
    pub const MIN_TILE_HEIGHT: u32 = 300;
}
