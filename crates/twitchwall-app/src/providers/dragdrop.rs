//! Keyboard drag-and-drop
//!
//! A [`DragDropProvider`] for frontends without a pointer: grab a tile,
//! move it with the arrow keys, then drop or cancel. Moves only change the
//! preview; handlers hear about a reorder once, when the tile is dropped
//! somewhere new.

use tracing::debug;
use twitchwall::registry::Placement;
use twitchwall::resize::TileSize;

use super::traits::{DragDropProvider, ReorderHandler, ResizeHandler};
use super::types::{ReorderGesture, ResizeGesture};

#[derive(Debug, Clone)]
struct Grab {
    id: String,
    /// Index the tile was grabbed from
    origin: usize,
    /// Current preview index
    index: usize,
}

/// Grab / move / drop gestures driven by key presses
#[derive(Default)]
pub struct KeyboardDragDrop {
    grab: Option<Grab>,
    reorder_handlers: Vec<ReorderHandler>,
    resize_handlers: Vec<ResizeHandler>,
}

impl KeyboardDragDrop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any handler is registered
    pub fn is_attached(&self) -> bool {
        !self.reorder_handlers.is_empty() || !self.resize_handlers.is_empty()
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Id of the tile being dragged
    pub fn grabbed(&self) -> Option<&str> {
        self.grab.as_ref().map(|g| g.id.as_str())
    }

    /// Start dragging `id` within `order`. Returns `false` if it isn't there.
    pub fn grab(&mut self, order: &[String], id: &str) -> bool {
        match order.iter().position(|o| o == id) {
            Some(origin) => {
                self.grab = Some(Grab {
                    id: id.to_string(),
                    origin,
                    index: origin,
                });
                true
            }
            None => false,
        }
    }

    /// Move the dragged tile by `delta` slots, clamped to `0..len`
    pub fn move_by(&mut self, len: usize, delta: isize) {
        if let Some(grab) = &mut self.grab {
            let last = len.saturating_sub(1);
            grab.index = grab.index.saturating_add_signed(delta).min(last);
        }
    }

    /// `order` as it looks with the dragged tile at its preview slot
    pub fn preview(&self, order: &[String]) -> Vec<String> {
        let Some(grab) = &self.grab else {
            return order.to_vec();
        };
        let mut preview: Vec<String> = order.iter().filter(|o| **o != grab.id).cloned().collect();
        let index = grab.index.min(preview.len());
        preview.insert(index, grab.id.clone());
        preview
    }

    /// Drop the dragged tile at its preview slot
    ///
    /// Fires the reorder handlers and returns the gesture, unless the tile
    /// landed where it started.
    pub fn drop_grabbed(&mut self, order: &[String]) -> Option<ReorderGesture> {
        let grab = self.grab.take()?;
        if grab.index == grab.origin {
            return None;
        }

        let preview = {
            let mut rest: Vec<&String> = order.iter().filter(|o| **o != grab.id).collect();
            let index = grab.index.min(rest.len());
            rest.insert(index, &grab.id);
            rest
        };
        let index = preview.iter().position(|o| **o == grab.id)?;
        let placement = if index > 0 {
            Placement::After(preview[index - 1].clone())
        } else {
            Placement::Before(preview.get(1)?.to_string())
        };

        let gesture = ReorderGesture {
            id: grab.id,
            placement,
        };
        debug!(?gesture, "Tile dropped");
        for handler in &mut self.reorder_handlers {
            handler(gesture.clone());
        }
        Some(gesture)
    }

    /// Abandon the drag without reordering anything
    pub fn cancel(&mut self) {
        self.grab = None;
    }

    /// Complete a resize of `id` to `size`
    pub fn resize(&mut self, id: &str, size: TileSize) {
        for handler in &mut self.resize_handlers {
            handler(ResizeGesture {
                id: id.to_string(),
                size,
            });
        }
    }
}

impl DragDropProvider for KeyboardDragDrop {
    fn on_reorder(&mut self, handler: ReorderHandler) {
        self.reorder_handlers.push(handler);
    }

    fn on_resize(&mut self, handler: ResizeHandler) {
        self.resize_handlers.push(handler);
    }
}
