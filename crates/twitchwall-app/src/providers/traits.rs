//! Provider traits
//!
//! Narrow capability interfaces for the collaborators the dashboard does
//! not implement itself: where the streamer list comes from, the video
//! embed widget, and the drag/drop gesture library.

use crate::error::Result;

use super::types::{EmbedHandle, EmbedOptions, ReorderGesture, ResizeGesture};

/// A source of the newline-separated streamer list
pub trait StreamerSource {
    /// Human-readable location (path or URL), for logs
    fn location(&self) -> &str;

    /// Fetch the raw list text
    fn fetch(&self) -> Result<String>;
}

/// A live video embed widget
///
/// The dashboard creates and destroys embed containers; everything inside
/// an embed belongs to the provider.
pub trait EmbedProvider {
    /// Display name for the provider (e.g., "Twitch")
    fn name(&self) -> &'static str;

    /// Create an embed for `channel` inside `container_id`
    fn create(
        &mut self,
        container_id: &str,
        channel: &str,
        options: &EmbedOptions,
    ) -> Result<EmbedHandle>;

    /// Tear down an embed
    fn destroy(&mut self, _handle: &EmbedHandle) {}
}

/// Called once per completed drop
pub type ReorderHandler = Box<dyn FnMut(ReorderGesture) + Send>;

/// Called once per completed resize
pub type ResizeHandler = Box<dyn FnMut(ResizeGesture) + Send>;

/// Pointer (or keyboard) drag-and-drop and resize gestures
///
/// Implementations detect the gestures; the dashboard only supplies what
/// happens when one completes. Intermediate drag positions never reach the
/// handlers.
pub trait DragDropProvider {
    fn on_reorder(&mut self, handler: ReorderHandler);

    fn on_resize(&mut self, _handler: ResizeHandler) {}
}
