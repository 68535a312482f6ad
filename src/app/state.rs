//! Application state management
//!
//! Defines the overlay state and the input routing state machine. Routing
//! is a pure function of (state, event) so every transition can be tested
//! without a window; the controller executes the resulting commands.

use crate::config::PersistedSettings;
use crate::domain::core::{Point, Rect};
use crate::input::{InputEvent, Key};

/// Interaction mode of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Display only: click-through and borderless
    #[default]
    Locked,
    /// Interactive: solid, decorated, accepts drag/resize/click input
    Edit,
}

/// The single process-wide overlay state, owned by the UI thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayState {
    pub mode: Mode,
    /// Last known window rectangle in screen coordinates
    pub window_rect: Rect,
    /// User-placed marker in client coordinates
    pub marker: Option<Point>,
}

impl OverlayState {
    /// Creates the startup state from persisted settings (always locked)
    pub fn from_settings(settings: PersistedSettings) -> Self {
        Self {
            mode: Mode::Locked,
            window_rect: settings.window_rect,
            marker: settings.marker,
        }
    }

    /// Snapshot of the persisted part of the state
    pub fn settings(&self) -> PersistedSettings {
        PersistedSettings::new(self.window_rect, self.marker)
    }
}

/// Side effects requested by the router, executed in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnterEditMode,
    ExitToLocked,
    PlaceMarker(Point),
    ClearMarker,
    Repaint,
    Persist,
    /// Ask the host to destroy the overlay window
    CloseWindow,
    /// Ask the host to leave the message loop
    Quit,
}

/// State machine for input routing
pub struct InputRouter;

impl InputRouter {
    /// Maps an event to the commands it triggers in the current state
    ///
    /// Events that are not valid in the current mode produce no commands.
    pub fn route(state: &OverlayState, event: &InputEvent) -> Vec<Command> {
        match (state.mode, event) {
            (mode, InputEvent::Hotkey | InputEvent::TrayToggle) => vec![Self::toggle(mode)],

            (Mode::Edit, InputEvent::KeyDown(Key::Escape)) => vec![Command::ExitToLocked],

            (Mode::Edit, InputEvent::LeftButtonDown(point)) => {
                vec![Command::PlaceMarker(*point), Command::Repaint]
            }

            (Mode::Edit, InputEvent::RightButtonDown) => {
                vec![Command::ClearMarker, Command::Repaint]
            }

            (_, InputEvent::TrayExit) => vec![Command::Persist, Command::CloseWindow],

            (_, InputEvent::WindowDestroyed) => vec![Command::Persist, Command::Quit],

            // Invalid in the current mode - ignore event
            _ => Vec::new(),
        }
    }

    fn toggle(mode: Mode) -> Command {
        match mode {
            Mode::Locked => Command::EnterEditMode,
            Mode::Edit => Command::ExitToLocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mode: Mode) -> OverlayState {
        OverlayState {
            mode,
            window_rect: Rect::new(100, 100, 900, 600),
            marker: None,
        }
    }

    #[test]
    fn default_mode_is_locked() {
        assert_eq!(Mode::default(), Mode::Locked);
        let state = OverlayState::from_settings(PersistedSettings::new(Rect::new(0, 0, 10, 10), None));
        assert_eq!(state.mode, Mode::Locked);
    }

    #[test]
    fn hotkey_toggles_in_both_modes() {
        assert_eq!(
            InputRouter::route(&state(Mode::Locked), &InputEvent::Hotkey),
            vec![Command::EnterEditMode]
        );
        assert_eq!(
            InputRouter::route(&state(Mode::Edit), &InputEvent::Hotkey),
            vec![Command::ExitToLocked]
        );
    }

    #[test]
    fn tray_toggle_matches_hotkey() {
        for mode in [Mode::Locked, Mode::Edit] {
            assert_eq!(
                InputRouter::route(&state(mode), &InputEvent::TrayToggle),
                InputRouter::route(&state(mode), &InputEvent::Hotkey)
            );
        }
    }

    #[test]
    fn escape_only_exits_edit_mode() {
        let escape = InputEvent::KeyDown(Key::Escape);
        assert_eq!(
            InputRouter::route(&state(Mode::Edit), &escape),
            vec![Command::ExitToLocked]
        );
        assert!(InputRouter::route(&state(Mode::Locked), &escape).is_empty());
    }

    #[test]
    fn other_keys_are_ignored() {
        let key = InputEvent::KeyDown(Key::Other(0x41));
        assert!(InputRouter::route(&state(Mode::Edit), &key).is_empty());
        assert!(InputRouter::route(&state(Mode::Locked), &key).is_empty());
    }

    #[test]
    fn clicks_edit_marker_only_in_edit_mode() {
        let left = InputEvent::LeftButtonDown(Point::new(150, 75));
        assert_eq!(
            InputRouter::route(&state(Mode::Edit), &left),
            vec![Command::PlaceMarker(Point::new(150, 75)), Command::Repaint]
        );
        assert_eq!(
            InputRouter::route(&state(Mode::Edit), &InputEvent::RightButtonDown),
            vec![Command::ClearMarker, Command::Repaint]
        );

        assert!(InputRouter::route(&state(Mode::Locked), &left).is_empty());
        assert!(InputRouter::route(&state(Mode::Locked), &InputEvent::RightButtonDown).is_empty());
    }

    #[test]
    fn exit_and_destroy_persist_first() {
        for mode in [Mode::Locked, Mode::Edit] {
            assert_eq!(
                InputRouter::route(&state(mode), &InputEvent::TrayExit),
                vec![Command::Persist, Command::CloseWindow]
            );
            assert_eq!(
                InputRouter::route(&state(mode), &InputEvent::WindowDestroyed),
                vec![Command::Persist, Command::Quit]
            );
        }
    }

    #[test]
    fn settings_snapshot_roundtrip() {
        let mut state = state(Mode::Edit);
        state.marker = Some(Point::new(3, 4));
        let restored = OverlayState::from_settings(state.settings());
        assert_eq!(restored.window_rect, state.window_rect);
        assert_eq!(restored.marker, state.marker);
        assert_eq!(restored.mode, Mode::Locked);
    }
}
