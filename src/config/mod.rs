//! Configuration module for the grid overlay
//!
//! Holds the compiled-in overlay constants and the persisted settings
//! snapshot that is read at startup and written on every lock.

pub mod overlay;
pub mod settings;

pub use overlay::OverlayConfig;
pub use settings::{PersistedSettings, SettingsStore, StoreError};
