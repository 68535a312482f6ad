//! Notification-area icon and its context menu
//!
//! The icon reports mouse activity to the overlay window through
//! `WM_TRAY_CALLBACK`. Menu selections come back as ordinary WM_COMMAND
//! messages carrying `ID_TRAY_TOGGLE` or `ID_TRAY_EXIT`.

use tracing::{debug, warn};
use windows::core::w;
use windows::Win32::Foundation::{HWND, LPARAM, POINT, WPARAM};
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_SETVERSION, NOTIFYICONDATAW,
    NOTIFYICON_VERSION_4, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, GetCursorPos, HMENU, IDI_APPLICATION, LoadIconW,
    MF_SEPARATOR, MF_STRING, PostMessageW, SetForegroundWindow, TPM_BOTTOMALIGN, TPM_LEFTALIGN,
    TPM_RIGHTBUTTON, TrackPopupMenu, WM_APP, WM_CONTEXTMENU, WM_LBUTTONUP, WM_NULL, WM_RBUTTONUP,
};

/// Message the shell posts to the overlay window for icon activity
pub const WM_TRAY_CALLBACK: u32 = WM_APP + 1;

/// Menu command: toggle between locked and edit mode
pub const ID_TRAY_TOGGLE: u32 = 1001;

/// Menu command: shut the overlay down
pub const ID_TRAY_EXIT: u32 = 1002;

const TRAY_ICON_ID: u32 = 1;

/// Tray errors
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    #[error("Failed to add notification area icon")]
    AddFailed,

    #[error("Failed to build tray menu: {0}")]
    MenuFailed(#[from] windows::core::Error),
}

/// Returns true for the notification codes that open the menu
pub fn opens_menu(notification: u32) -> bool {
    matches!(notification, WM_LBUTTONUP | WM_RBUTTONUP | WM_CONTEXTMENU)
}

/// Notification-area icon owned by the overlay window, removed on drop
#[derive(Debug)]
pub struct TrayIcon {
    hwnd: HWND,
}

impl TrayIcon {
    pub fn add(hwnd: HWND, tooltip: &str) -> Result<Self, TrayError> {
        let mut data = notify_data(hwnd);
        data.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
        data.uCallbackMessage = WM_TRAY_CALLBACK;
        data.hIcon = unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default();
        copy_tooltip(&mut data.szTip, tooltip);

        if !unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
            return Err(TrayError::AddFailed);
        }

        data.Anonymous.uVersion = NOTIFYICON_VERSION_4;
        if !unsafe { Shell_NotifyIconW(NIM_SETVERSION, &data) }.as_bool() {
            warn!("tray icon rejected NOTIFYICON_VERSION_4");
        }

        debug!(tooltip, "tray icon added");
        Ok(Self { hwnd })
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        let data = notify_data(self.hwnd);
        if unsafe { Shell_NotifyIconW(NIM_DELETE, &data) }.as_bool() {
            debug!("tray icon removed");
        } else {
            warn!("failed to remove tray icon");
        }
    }
}

/// Popup menu handle, destroyed on drop
struct PopupMenu(HMENU);

impl Drop for PopupMenu {
    fn drop(&mut self) {
        if let Err(err) = unsafe { DestroyMenu(self.0) } {
            warn!(%err, "failed to destroy tray menu");
        }
    }
}

/// Shows the tray menu at the cursor
///
/// Blocks in the menu's modal loop; the chosen item is posted to `hwnd`
/// as WM_COMMAND afterwards.
pub fn show_context_menu(hwnd: HWND) -> Result<(), TrayError> {
    let menu = PopupMenu(unsafe { CreatePopupMenu() }?);
    unsafe {
        AppendMenuW(menu.0, MF_STRING, ID_TRAY_TOGGLE as usize, w!("Toggle resize/edit mode"))?;
        AppendMenuW(menu.0, MF_SEPARATOR, 0, None)?;
        AppendMenuW(menu.0, MF_STRING, ID_TRAY_EXIT as usize, w!("Exit"))?;
    }

    let mut cursor = POINT::default();
    unsafe { GetCursorPos(&mut cursor) }?;

    unsafe {
        // Without foreground activation the menu never dismisses on outside clicks
        let _ = SetForegroundWindow(hwnd);
        let _ = TrackPopupMenu(
            menu.0,
            TPM_LEFTALIGN | TPM_BOTTOMALIGN | TPM_RIGHTBUTTON,
            cursor.x,
            cursor.y,
            0,
            hwnd,
            None,
        );
        PostMessageW(hwnd, WM_NULL, WPARAM(0), LPARAM(0))?;
    }

    Ok(())
}

fn notify_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        ..Default::default()
    }
}

/// Copies `text` into a fixed UTF-16 buffer, truncating and NUL-terminating
fn copy_tooltip(buffer: &mut [u16], text: &str) {
    let capacity = buffer.len().saturating_sub(1);
    let mut written = 0;
    for (slot, unit) in buffer.iter_mut().zip(text.encode_utf16().take(capacity)) {
        *slot = unit;
        written += 1;
    }
    if let Some(terminator) = buffer.get_mut(written) {
        *terminator = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_fits_buffer() {
        let mut buffer = [0xFFFFu16; 8];
        copy_tooltip(&mut buffer, "Grid");
        assert_eq!(&buffer[..5], &[71, 114, 105, 100, 0]);
    }

    #[test]
    fn long_tooltip_is_truncated() {
        let mut buffer = [0xFFFFu16; 4];
        copy_tooltip(&mut buffer, "Grid Overlay");
        assert_eq!(buffer, [71, 114, 105, 0]);
    }

    #[test]
    fn menu_opens_on_clicks_only() {
        assert!(opens_menu(WM_LBUTTONUP));
        assert!(opens_menu(WM_RBUTTONUP));
        assert!(opens_menu(WM_CONTEXTMENU));
        assert!(!opens_menu(WM_APP));
    }

    #[test]
    fn callback_message_is_app_range() {
        assert_eq!(WM_TRAY_CALLBACK, 0x8001);
    }
}
