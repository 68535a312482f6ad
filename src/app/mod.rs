//! Application orchestration layer
//!
//! This module coordinates between input, state, UI, and persistence.
//! It owns the overlay state and performs the mode transitions.

pub mod controller;
pub mod state;
pub mod surface;

pub use controller::{Flow, OverlayController};
pub use state::OverlayState;
pub use surface::{SurfaceStyle, WindowSurface};
