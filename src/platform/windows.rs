//! General Windows platform utilities
//!
//! This module contains Win32 helper functions that don't fit into
//! other specialized platform modules.

use tracing::warn;
use windows::Win32::Foundation::{COLORREF, RECT};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

use crate::domain::core::{Rect, Rgb};

/// Opts the process into per-monitor DPI awareness
///
/// Must run before any window is created so rectangles are real pixels.
/// Failure (e.g. awareness already set by a manifest) is not fatal.
/// Rectangles saved by earlier DPI-unaware builds are logical pixels and
/// are read back unconverted.
pub fn enable_dpi_awareness() {
    if let Err(err) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        warn!(%err, "could not set per-monitor DPI awareness");
    }
}

/// Encodes a string as a NUL-terminated UTF-16 buffer
pub fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Converts a color to a GDI COLORREF (0x00BBGGRR)
pub fn colorref(color: Rgb) -> COLORREF {
    COLORREF(u32::from(color.r) | (u32::from(color.g) << 8) | (u32::from(color.b) << 16))
}

/// Converts a Windows RECT to domain rectangle
pub fn win32_rect_to_rect(rect: &RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}
