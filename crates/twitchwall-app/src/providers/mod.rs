//! External collaborators
//!
//! Streamer list sources, the video embed widget and the drag/drop
//! gesture provider, each behind a narrow trait.

pub mod dragdrop;
pub mod source;
pub mod traits;
pub mod twitch;
pub mod types;

// Re-exports
pub use dragdrop::KeyboardDragDrop;
pub use source::{source_for, FileSource, HttpSource};
pub use traits::{DragDropProvider, EmbedProvider, ReorderHandler, ResizeHandler, StreamerSource};
pub use twitch::TwitchEmbedProvider;
pub use types::{EmbedHandle, EmbedOptions, ReorderGesture, ResizeGesture};
