//! Stream registry
//!
//! Ordered, in-memory list of known stream tiles. Positions are kept dense
//! (`0..len`) after every mutation. The registry never touches storage;
//! callers persist the changes it reports.

use tracing::debug;

use crate::entry::{channel_of, StreamEntry, Visibility};
use crate::error::{LayoutError, Result};
use crate::resize::TileSize;

/// Where a dragged tile lands relative to the drop target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Before(String),
    After(String),
}

impl Placement {
    /// Id of the tile the placement is relative to
    pub fn target(&self) -> &str {
        match self {
            Placement::Before(id) | Placement::After(id) => id,
        }
    }
}

/// Ordered collection of stream tiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamRegistry {
    entries: Vec<StreamEntry>,
}

impl StreamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from names in discovery order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        registry.load(names);
        registry
    }

    /// Replace all entries, positioned by input order and all visible
    ///
    /// Blank names are skipped and repeated names keep their first position.
    pub fn load<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.clear();
        for name in names {
            self.add(name.as_ref());
        }
    }

    /// Append a visible entry at the end
    ///
    /// Returns `false` (and changes nothing) for blank or already known names.
    pub fn add(&mut self, name: &str) -> bool {
        let channel = channel_of(name);
        if channel.is_empty() || self.contains(channel) {
            return false;
        }
        let position = self.entries.len();
        self.entries.push(StreamEntry::new(channel, position));
        true
    }

    /// Hide a tile. Returns whether anything changed.
    ///
    /// Unknown ids and already hidden tiles are no-ops.
    pub fn hide(&mut self, id: &str) -> bool {
        self.set_visibility(id, Visibility::Hidden)
    }

    /// Unhide a tile. Returns whether anything changed.
    pub fn unhide(&mut self, id: &str) -> bool {
        self.set_visibility(id, Visibility::Visible)
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) -> bool {
        match self.entries.iter_mut().find(|e| e.matches(id)) {
            Some(entry) if entry.visibility != visibility => {
                entry.visibility = visibility;
                debug!(tile = %entry.id, ?visibility, "Visibility changed");
                true
            }
            _ => false,
        }
    }

    /// Make every tile visible, returning the ids that were hidden
    pub fn show_all(&mut self) -> Vec<String> {
        let mut unhidden = Vec::new();
        for entry in &mut self.entries {
            if entry.visibility == Visibility::Hidden {
                entry.visibility = Visibility::Visible;
                unhidden.push(entry.id.clone());
            }
        }
        unhidden
    }

    /// Move one tile before or after another, shifting the rest
    ///
    /// Returns `Ok(false)` when the tile already sits at the requested spot
    /// (including a drop onto itself).
    pub fn reorder(&mut self, id: &str, placement: &Placement) -> Result<bool> {
        let from = self
            .index_of(id)
            .ok_or_else(|| LayoutError::UnknownTile(id.to_string()))?;
        let target = self
            .index_of(placement.target())
            .ok_or_else(|| LayoutError::UnknownTile(placement.target().to_string()))?;
        if from == target {
            return Ok(false);
        }

        // Index of the target once the moved tile is taken out
        let target = if target > from { target - 1 } else { target };
        let to = match placement {
            Placement::Before(_) => target,
            Placement::After(_) => target + 1,
        };
        if to == from {
            return Ok(false);
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
        debug!(tile = id, from, to, "Tile reordered");
        Ok(true)
    }

    /// Move the given ids to the front in that relative sequence
    ///
    /// Unknown and repeated ids are skipped. Everything else keeps its
    /// relative order after the moved tiles.
    pub fn move_to_front<S: AsRef<str>>(&mut self, ids: &[S]) {
        let mut rest = std::mem::take(&mut self.entries);
        let mut front = Vec::with_capacity(rest.len());
        for id in ids {
            if let Some(i) = rest.iter().position(|e| e.matches(id.as_ref())) {
                front.push(rest.remove(i));
            }
        }
        front.extend(rest);
        self.entries = front;
        self.renumber();
    }

    /// Record a tile size (clamped to the minimum). Returns whether the tile exists.
    pub fn resize(&mut self, id: &str, size: TileSize) -> bool {
        match self.entries.iter_mut().find(|e| e.matches(id)) {
            Some(entry) => {
                entry.size = Some(size.clamped());
                true
            }
            None => false,
        }
    }

    /// Drop every custom tile size
    pub fn clear_sizes(&mut self) {
        for entry in &mut self.entries {
            entry.size = None;
        }
    }

    fn renumber(&mut self) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.position = position;
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(id))
    }

    // === Queries ===

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&StreamEntry> {
        self.entries.iter().find(|e| e.matches(id))
    }

    /// All entries in render order
    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn visible(&self) -> impl Iterator<Item = &StreamEntry> {
        self.entries.iter().filter(|e| e.is_visible())
    }

    /// Ids of hidden tiles, in render order
    pub fn hidden_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_visible())
            .map(|e| e.id.clone())
            .collect()
    }

    /// Tile ids in render order
    pub fn order(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Channel names in render order
    pub fn channels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.channel.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
