pub mod events;
#[cfg(windows)]
pub mod hotkeys;

pub use events::{InputEvent, Key};
#[cfg(windows)]
pub use hotkeys::{HotkeyModifier, HotkeyRegistration};
