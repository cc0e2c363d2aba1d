//! Twitchwall App Services
//!
//! Preference persistence, streamer sources, embed and drag/drop providers,
//! and the dashboard controller. Depends on the `twitchwall` layout crate.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod network;
pub mod providers;
