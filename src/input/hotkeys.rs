//! Global hotkey registration
//!
//! The hotkey is registered on the overlay window itself, so WM_HOTKEY
//! arrives on the UI thread's message loop. Follows RAII patterns for
//! automatic cleanup.

use tracing::{debug, warn};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    HOT_KEY_MODIFIERS, RegisterHotKey, UnregisterHotKey,
};

/// Modifier keys for hotkey combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyModifier {
    Alt = 1,
    Control = 2,
}

/// Hotkey registration errors
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Failed to register hotkey {id} (vk {vk:#x}): {source}")]
    RegistrationFailed {
        id: i32,
        vk: u32,
        source: windows::core::Error,
    },
}

/// A registered global hotkey, unregistered on drop
#[derive(Debug)]
pub struct HotkeyRegistration {
    hwnd: HWND,
    id: i32,
}

impl HotkeyRegistration {
    /// Registers `modifiers + vk` for `hwnd`; WM_HOTKEY carries `id`
    pub fn register(
        hwnd: HWND,
        id: i32,
        modifiers: &[HotkeyModifier],
        vk: u32,
    ) -> Result<Self, HotkeyError> {
        let modifier_mask = modifier_mask(modifiers);

        unsafe { RegisterHotKey(hwnd, id, HOT_KEY_MODIFIERS(modifier_mask), vk) }
            .map_err(|source| HotkeyError::RegistrationFailed { id, vk, source })?;

        debug!(id, vk, ?modifiers, "hotkey registered");
        Ok(Self { hwnd, id })
    }

    pub fn id(&self) -> i32 {
        self.id
    }
}

impl Drop for HotkeyRegistration {
    fn drop(&mut self) {
        if let Err(err) = unsafe { UnregisterHotKey(self.hwnd, self.id) } {
            warn!(id = self.id, %err, "failed to unregister hotkey");
        } else {
            debug!(id = self.id, "hotkey unregistered");
        }
    }
}

fn modifier_mask(modifiers: &[HotkeyModifier]) -> u32 {
    modifiers
        .iter()
        .fold(0u32, |acc, &modifier| acc | modifier as u32)
}
