//! Application layer
//!
//! The controller that wires sources, preferences and providers to the
//! dashboard state.

pub mod controller;

pub use controller::DashboardController;
