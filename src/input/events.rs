//! Platform-neutral input events
//!
//! The window procedure translates raw window messages into these events
//! before handing them to the router. Decoding helpers work on the raw
//! integer payloads so they can be tested without a window.

use crate::domain::core::Point;

const VK_ESCAPE: u32 = 0x1b;

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    /// Any other virtual key (passed through unhandled)
    Other(u32),
}

impl Key {
    /// Convert Windows virtual key code to Key
    pub fn from_vk_code(vk_code: u32) -> Self {
        match vk_code {
            VK_ESCAPE => Key::Escape,
            other => Key::Other(other),
        }
    }
}

/// Input events routed to the overlay state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The global toggle hotkey fired
    Hotkey,
    /// A key was pressed while the overlay had focus
    KeyDown(Key),
    /// Left mouse button pressed at a client point
    LeftButtonDown(Point),
    /// Right mouse button pressed anywhere in the client area
    RightButtonDown,
    /// "Toggle resize/edit mode" chosen from the tray menu
    TrayToggle,
    /// "Exit" chosen from the tray menu
    TrayExit,
    /// The overlay window is being destroyed
    WindowDestroyed,
}

/// Decodes a client point from a mouse message lParam
///
/// Coordinates are signed 16-bit values packed into the low dword.
pub fn point_from_lparam(lparam: isize) -> Point {
    let raw = lparam as u32;
    let x = (raw & 0xFFFF) as u16 as i16 as i32;
    let y = ((raw >> 16) & 0xFFFF) as u16 as i16 as i32;
    Point::new(x, y)
}

/// Extracts the notification code from a tray callback lParam
///
/// With notification version 4 the mouse message sits in the low word.
pub fn tray_notification_code(lparam: isize) -> u32 {
    (lparam as u32) & 0xFFFF
}

/// Extracts the command identifier from a WM_COMMAND wParam
pub fn command_id(wparam: usize) -> u32 {
    (wparam as u32) & 0xFFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_maps_to_escape() {
        assert_eq!(Key::from_vk_code(0x1b), Key::Escape);
        assert_eq!(Key::from_vk_code(0x47), Key::Other(0x47));
    }

    #[test]
    fn point_decoding() {
        let lparam = (75 << 16) | 150;
        assert_eq!(point_from_lparam(lparam), Point::new(150, 75));
    }

    #[test]
    fn point_decoding_keeps_sign() {
        let lparam = ((0xFFFEu32 << 16) | 0xFFFF) as isize;
        assert_eq!(point_from_lparam(lparam), Point::new(-1, -2));
    }

    #[test]
    fn tray_code_uses_low_word() {
        // Icon id in the high word must be ignored
        let lparam = (1 << 16) | 0x0205;
        assert_eq!(tray_notification_code(lparam), 0x0205);
    }

    #[test]
    fn command_id_uses_low_word() {
        assert_eq!(command_id((1 << 16) | 1002), 1002);
    }
}
