//! Dashboard commands
//!
//! `DashboardCommand` is the unified set of user actions sent by any
//! frontend. `DashboardState::apply` performs the pure state transition and
//! returns a [`Transition`] describing what the caller has to persist and
//! which embeds it has to create.

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::reconciler::{parse_streamer_list, reconcile, SavedLayout};
use crate::registry::{Placement, StreamRegistry};
use crate::resize::TileSize;

/// User actions on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Hide one tile
    Hide(String),
    /// Unhide one tile
    Unhide(String),
    /// Unhide every hidden tile
    UnhideAll,
    /// Unhide every tile and restore the default grid sizes
    ShowAll,
    /// Completed drag-and-drop of `id` onto another tile
    Reorder { id: String, placement: Placement },
    /// One name or newline-delimited names
    AddStreams(String),
    /// Completed resize gesture
    Resize { id: String, size: TileSize },
    /// Forget saved order and hidden set, back to discovery order
    ResetLayout,
}

/// Side effects required by a state transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Hidden flags to write, `(tile id, hidden)`
    pub hidden_changes: Vec<(String, bool)>,
    /// Whether the full render order must be saved
    pub save_order: bool,
    /// Whether all saved preferences must be cleared
    pub clear_preferences: bool,
    /// Tile ids created by this transition
    pub added: Vec<String>,
    /// Whether every tile was rebuilt (embeds must be recreated)
    pub rebuilt: bool,
}

impl Transition {
    /// Nothing changed and nothing needs to be persisted
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    fn hidden(id: &str, hidden: bool) -> Self {
        Self {
            hidden_changes: vec![(id.to_string(), hidden)],
            ..Self::default()
        }
    }
}

/// Dashboard state owned by the controller
///
/// Holds the authoritative registry plus the discovery list (names from the
/// streamer source followed by names added this session), which is what a
/// layout reset falls back to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    discovered: Vec<String>,
    registry: StreamRegistry,
}

impl DashboardState {
    /// Empty dashboard (nothing fetched)
    pub fn new() -> Self {
        Self::default()
    }

    /// Dashboard for `names` with the saved layout applied
    pub fn reconciled<I, S>(names: I, saved: &SavedLayout) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let baseline = StreamRegistry::from_names(names);
        let discovered = baseline.channels();
        Self {
            registry: reconcile(&discovered, saved),
            discovered,
        }
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// Channel names in discovery order
    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    /// Apply a command to the state
    ///
    /// Hide/unhide of unknown tiles is a silent no-op. Reorder and resize
    /// of unknown tiles return [`LayoutError::UnknownTile`].
    pub fn apply(&mut self, command: &DashboardCommand) -> Result<Transition> {
        let transition = match command {
            DashboardCommand::Hide(id) => {
                if self.registry.hide(id) {
                    Transition::hidden(&self.canonical_id(id), true)
                } else {
                    Transition::default()
                }
            }
            DashboardCommand::Unhide(id) => {
                if self.registry.unhide(id) {
                    Transition::hidden(&self.canonical_id(id), false)
                } else {
                    Transition::default()
                }
            }
            DashboardCommand::UnhideAll => Transition {
                hidden_changes: self.unhide_all(),
                ..Transition::default()
            },
            DashboardCommand::ShowAll => {
                self.registry.clear_sizes();
                Transition {
                    hidden_changes: self.unhide_all(),
                    ..Transition::default()
                }
            }
            DashboardCommand::Reorder { id, placement } => Transition {
                save_order: self.registry.reorder(id, placement)?,
                ..Transition::default()
            },
            DashboardCommand::AddStreams(text) => {
                let mut added = Vec::new();
                for name in parse_streamer_list(text) {
                    if self.registry.add(&name) {
                        added.push(self.canonical_id(&name));
                        self.discovered.push(name);
                    }
                }
                // Added tiles start visible, so any stale hidden flag goes
                Transition {
                    hidden_changes: added.iter().map(|id| (id.clone(), false)).collect(),
                    added,
                    ..Transition::default()
                }
            }
            DashboardCommand::Resize { id, size } => {
                if !self.registry.resize(id, *size) {
                    return Err(LayoutError::UnknownTile(id.clone()));
                }
                Transition::default()
            }
            DashboardCommand::ResetLayout => {
                self.registry = reconcile(&self.discovered, &SavedLayout::default());
                Transition {
                    clear_preferences: true,
                    rebuilt: true,
                    ..Transition::default()
                }
            }
        };

        debug!(?command, ?transition, "Command applied");
        Ok(transition)
    }

    fn unhide_all(&mut self) -> Vec<(String, bool)> {
        self.registry
            .show_all()
            .into_iter()
            .map(|id| (id, false))
            .collect()
    }

    /// Tile id for an id given in either form
    fn canonical_id(&self, id: &str) -> String {
        self.registry
            .get(id)
            .map(|e| e.id.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
