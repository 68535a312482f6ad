//! Window attributes required by each interaction mode
//!
//! `WindowSurface` is the seam between the controller and the windowing
//! system. The Win32 overlay implements it; tests use a recording fake.

use crate::app::state::Mode;
use crate::config::OverlayConfig;
use crate::domain::core::{Rect, Rgb};

/// Pixel transparency technique of the layered window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transparency {
    /// Pixels of exactly this color are transparent and click-through
    ColorKey(Rgb),
    /// Whole-window alpha; every pixel is hit-testable
    Alpha(u8),
}

/// Complete set of window attributes for one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub transparency: Transparency,
    /// Input-transparent window (mouse passes through to windows below)
    pub click_through: bool,
    /// Title bar, system menu and sizing border
    pub chrome: bool,
    pub caption: &'static str,
}

impl SurfaceStyle {
    pub fn for_mode(mode: Mode, config: &OverlayConfig) -> Self {
        match mode {
            Mode::Locked => Self {
                transparency: Transparency::ColorKey(config.color_key),
                click_through: true,
                chrome: false,
                caption: config.idle_caption,
            },
            Mode::Edit => Self {
                transparency: Transparency::Alpha(config.edit_alpha),
                click_through: false,
                chrome: true,
                caption: config.edit_caption,
            },
        }
    }
}

/// Window operations the controller needs
///
/// All operations are best-effort; failures are logged by the implementation.
pub trait WindowSurface {
    /// Applies transparency, input transparency, chrome and caption
    fn apply_style(&mut self, style: &SurfaceStyle);

    /// Raises the window to top-most z-order and gives it the foreground
    fn bring_to_front(&mut self);

    /// Current window rectangle in screen coordinates
    fn window_rect(&self) -> Option<Rect>;

    /// Moves and resizes the window, keeping it top-most
    fn set_window_rect(&mut self, rect: Rect);

    /// Schedules a full repaint; painting happens later on the message loop
    fn request_repaint(&mut self);
}
