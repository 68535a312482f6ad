//! Application controller and coordination layer
//!
//! The controller owns the overlay state, the window surface and the
//! settings store. It performs the two mode transitions and executes the
//! commands the input router produces for each event.

use tracing::{debug, info};

use crate::app::state::{Command, InputRouter, Mode, OverlayState};
use crate::app::surface::{SurfaceStyle, WindowSurface};
use crate::config::{settings, OverlayConfig, SettingsStore};
use crate::domain::core::Point;
use crate::input::InputEvent;

/// What the host must do after an event has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Destroy the overlay window (shutdown follows via `WindowDestroyed`)
    CloseWindow,
    /// Leave the message loop
    Quit,
}

/// Main application controller
pub struct OverlayController<W, S> {
    state: OverlayState,
    surface: W,
    store: S,
    config: OverlayConfig,
}

impl<W: WindowSurface, S: SettingsStore> OverlayController<W, S> {
    pub fn new(state: OverlayState, surface: W, store: S, config: OverlayConfig) -> Self {
        Self {
            state,
            surface,
            store,
            config,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn surface(&self) -> &W {
        &self.surface
    }

    #[cfg(test)]
    pub fn surface_mut(&mut self) -> &mut W {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switches to the interactive edit mode
    ///
    /// Already in edit mode: only re-asserts focus.
    pub fn enter_edit_mode(&mut self) {
        if self.state.mode == Mode::Edit {
            debug!("already in edit mode, re-asserting focus");
            self.surface.bring_to_front();
            return;
        }

        self.state.mode = Mode::Edit;
        self.surface
            .apply_style(&SurfaceStyle::for_mode(Mode::Edit, &self.config));
        self.surface.bring_to_front();
        self.surface.request_repaint();
        info!("entered edit mode");
    }

    /// Switches back to the click-through locked mode and persists settings
    ///
    /// Already locked: geometry is left alone, settings are still persisted.
    pub fn exit_to_locked(&mut self) {
        if self.state.mode == Mode::Locked {
            debug!("already locked");
            self.persist();
            return;
        }

        self.state.mode = Mode::Locked;
        self.capture_window_rect();
        self.surface
            .apply_style(&SurfaceStyle::for_mode(Mode::Locked, &self.config));
        self.surface.set_window_rect(self.state.window_rect);
        self.surface.request_repaint();
        self.persist();
        info!(rect = ?self.state.window_rect, "locked overlay");
    }

    pub fn place_marker(&mut self, point: Point) {
        debug!(?point, "marker placed");
        self.state.marker = Some(point);
    }

    pub fn clear_marker(&mut self) {
        if self.state.marker.take().is_some() {
            debug!("marker cleared");
        }
    }

    /// Writes the current geometry and marker to the settings store
    pub fn persist(&mut self) {
        settings::save(&mut self.store, &self.state.settings());
    }

    /// Routes an event and executes the resulting commands in order
    pub fn handle_event(&mut self, event: InputEvent) -> Flow {
        let commands = InputRouter::route(&self.state, &event);
        if commands.is_empty() {
            return Flow::Continue;
        }

        debug!(?event, ?commands, "routing event");
        let mut flow = Flow::Continue;
        for command in commands {
            match command {
                Command::EnterEditMode => self.enter_edit_mode(),
                Command::ExitToLocked => self.exit_to_locked(),
                Command::PlaceMarker(point) => self.place_marker(point),
                Command::ClearMarker => self.clear_marker(),
                Command::Repaint => self.surface.request_repaint(),
                Command::Persist => {
                    // Keep a resize that was never locked in
                    if self.state.mode == Mode::Edit {
                        self.capture_window_rect();
                    }
                    self.persist();
                }
                Command::CloseWindow => flow = Flow::CloseWindow,
                Command::Quit => flow = Flow::Quit,
            }
        }
        flow
    }

    fn capture_window_rect(&mut self) {
        match self.surface.window_rect() {
            Some(rect) if rect.is_valid() => self.state.window_rect = rect,
            other => debug!(rect = ?other, "keeping previous window rect"),
        }
    }
}
