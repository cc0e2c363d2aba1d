//! Twitchwall: stream tile layout engine
//!
//! Stream registry, layout reconciliation against saved preferences,
//! and the pure command transitions driven by the dashboard frontends.
//!
//! ## Quick start
//!
//! ```
//! use twitchwall::reconciler::{reconcile, SavedLayout};
//!
//! let saved = SavedLayout::new(["stream-div-b"], ["c", "a"]);
//! let registry = reconcile(["a", "b", "c"], &saved);
//! assert_eq!(registry.channels(), ["c", "a", "b"]);
//! assert!(!registry.get("b").unwrap().is_visible());
//! ```

pub mod command;
pub mod config;
pub mod entry;
pub mod error;
pub mod reconciler;
pub mod registry;
pub mod resize;

pub use command::{DashboardCommand, DashboardState, Transition};
pub use entry::{StreamEntry, Visibility};
pub use error::{LayoutError, Result};
pub use reconciler::{parse_streamer_list, reconcile, SavedLayout};
pub use registry::{Placement, StreamRegistry};
pub use resize::{TileChrome, TileSize};
