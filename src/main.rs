//! Grid overlay
//!
//! Draws a fixed 10x6 grid over the desktop in a top-most, click-through
//! window. Ctrl+Alt+G (or the tray menu) switches to edit mode where the
//! window can be moved, resized and clicked to place a marker; Escape or
//! the hotkey locks it again and saves the geometry.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code, unused_imports))]

mod app;
mod config;
mod domain;
mod input;
mod logging;
#[cfg(windows)]
mod platform;
mod ui;

#[cfg(windows)]
fn main() {
    use tracing::{error, info};

    use crate::app::{OverlayController, OverlayState};
    use crate::config::{settings, OverlayConfig};
    use crate::platform::registry::RegistryStore;
    use crate::ui::{overlay, FrameRenderer, LabelFont, OverlayHost, OverlayWindow};

    logging::init();
    platform::windows::enable_dpi_awareness();

    let config = OverlayConfig::default();
    let store = RegistryStore::new(config.settings_key);
    let persisted = settings::load(&store, config.default_window_rect);
    info!(rect = ?persisted.window_rect, marker = ?persisted.marker, "starting grid overlay");

    let window = match OverlayWindow::create(&config, persisted.window_rect) {
        Ok(window) => window,
        Err(err) => {
            error!(%err, "cannot create overlay window");
            std::process::exit(1);
        }
    };

    let label_font = if config.show_column_labels {
        LabelFont::load_system(config.label_font_files)
    } else {
        None
    };

    let state = OverlayState::from_settings(persisted);
    let controller = OverlayController::new(state, window, store, config);
    let renderer = FrameRenderer::new(label_font);
    if !renderer.has_label_font() {
        info!("column labels disabled");
    }
    let host = OverlayHost::new(controller, renderer);

    let code = overlay::run(host);
    info!(code, "grid overlay exiting");
    std::process::exit(code);
}

#[cfg(not(windows))]
fn main() {
    logging::init();
    tracing::error!("grid-overlay only runs on Windows");
    std::process::exit(1);
}
