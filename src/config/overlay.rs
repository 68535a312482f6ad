use crate::domain::core::{Rect, Rgb};
use crate::domain::grid::GridSpec;

/// Compiled-in configuration for the overlay
///
/// Nothing here changes at runtime; the struct exists so the rest of the
/// crate reads constants from one place and tests can tweak a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub grid: GridSpec,
    /// Geometry used when no valid rectangle has been persisted
    pub default_window_rect: Rect,

    /// Reserved background color treated as transparent in locked mode.
    /// Never used for anything that should stay visible.
    pub color_key: Rgb,
    /// Opaque background while editing
    pub edit_background: Rgb,
    pub grid_line_color: Rgb,
    pub label_color: Rgb,
    pub marker_color: Rgb,
    pub marker_radius: i32,
    /// Label glyph height as a fraction of one cell's height
    pub label_scale: f32,
    pub show_column_labels: bool,

    /// Whole-window alpha in edit mode. Must stay below 255 so the window
    /// keeps its layered attribute while every pixel stays hit-testable.
    pub edit_alpha: u8,

    pub idle_caption: &'static str,
    pub edit_caption: &'static str,
    pub tray_tooltip: &'static str,
    pub window_class_name: &'static str,
    pub settings_key: &'static str,

    pub hotkey_id: i32,
    /// Virtual key code of the global hotkey, used with Ctrl+Alt
    pub hotkey_vk: u32,

    /// Bold font files tried in order for column labels
    pub label_font_files: &'static [&'static str],
}

impl OverlayConfig {
    pub const GRID_COLUMNS: i32 = 10;
    pub const GRID_ROWS: i32 = 6;
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::new(Self::GRID_COLUMNS, Self::GRID_ROWS),
            default_window_rect: Rect::new(100, 100, 900, 600),
            color_key: Rgb::new(0, 0, 1),
            edit_background: Rgb::new(240, 240, 240),
            grid_line_color: Rgb::new(138, 43, 226),
            label_color: Rgb::new(138, 43, 226),
            marker_color: Rgb::new(255, 0, 0),
            marker_radius: 5,
            label_scale: 0.6,
            show_column_labels: true,
            edit_alpha: 254,
            idle_caption: "Grid Overlay",
            edit_caption: "Resize Mode (Press Ctrl+Alt+G or ESC to lock)",
            tray_tooltip: "Grid Overlay (Ctrl+Alt+G to resize)",
            window_class_name: "SimpleGridOverlayClass",
            settings_key: "Software\\SimpleGridOverlay",
            hotkey_id: 1,
            hotkey_vk: 0x47, // 'G'
            label_font_files: &["arialbd.ttf", "segoeuib.ttf", "tahomabd.ttf"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_known_layout() {
        let config = OverlayConfig::default();
        assert_eq!(config.grid, GridSpec::new(10, 6));
        assert_eq!(config.default_window_rect, Rect::new(100, 100, 900, 600));
        assert!(config.default_window_rect.is_valid());
        assert_eq!(config.marker_radius, 5);
    }

    #[test]
    fn color_key_is_not_used_for_visible_content() {
        let config = OverlayConfig::default();
        for visible in [
            config.edit_background,
            config.grid_line_color,
            config.label_color,
            config.marker_color,
        ] {
            assert_ne!(visible, config.color_key);
        }
    }

    #[test]
    fn edit_alpha_is_nearly_opaque() {
        let config = OverlayConfig::default();
        assert!(config.edit_alpha < u8::MAX);
        assert!(config.edit_alpha > 200);
    }
}
