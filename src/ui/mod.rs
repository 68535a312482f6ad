//! User interface: frame rendering, the overlay window and the tray icon

#[cfg(windows)]
pub mod overlay;
pub mod renderer;
#[cfg(windows)]
pub mod tray;

#[cfg(windows)]
pub use overlay::{OverlayHost, OverlayWindow};
pub use renderer::{FrameRenderer, LabelFont};
