//! Error types for the layout engine

use thiserror::Error;

/// Errors raised by registry mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Unknown stream tile: {0}")]
    UnknownTile(String),
}

/// Result type alias for the layout engine
pub type Result<T> = std::result::Result<T, LayoutError>;
