//! Grid rendering for the overlay window
//!
//! Rendering is split in two steps. `compute_drawables` is a pure function
//! of client size, mode and marker that yields drawing instructions; it is
//! recomputed from scratch on every paint. `FrameRenderer` rasterizes those
//! instructions into a tiny-skia pixmap that the window blits to screen.
//!
//! Anti-aliasing is disabled everywhere: in locked mode only pixels that
//! exactly equal the color key become transparent, so blended edges would
//! show up as a dark fringe.

use std::path::PathBuf;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect as SkiaRect, Transform};
use tracing::{debug, warn};

use crate::app::state::Mode;
use crate::config::OverlayConfig;
use crate::domain::core::{Point, Rect, Rgb};

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidCanvas { width: i32, height: i32 },

    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,
}

/// A single drawing instruction in client coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Solid fill of the whole client area
    Fill { color: Rgb },
    /// One-pixel vertical line spanning the client height
    VerticalLine { x: i32, height: i32, color: Rgb },
    /// One-pixel horizontal line spanning the client width
    HorizontalLine { y: i32, width: i32, color: Rgb },
    /// Text centered in `cell`
    ColumnLabel {
        text: String,
        cell: Rect,
        font_px: f32,
        color: Rgb,
    },
    /// Filled circle without outline
    Dot { center: Point, radius: i32, color: Rgb },
}

/// Computes the drawing instructions for one frame
///
/// Order: background, vertical lines, horizontal lines, column labels,
/// marker dot. A grid with a non-positive dimension yields only the
/// background, even when a marker is set.
pub fn compute_drawables(
    width: i32,
    height: i32,
    mode: Mode,
    marker: Option<Point>,
    config: &OverlayConfig,
) -> impl Iterator<Item = Drawable> {
    let grid = config.grid;
    let background = match mode {
        Mode::Edit => config.edit_background,
        Mode::Locked => config.color_key,
    };
    let line_color = config.grid_line_color;
    let label_color = config.label_color;
    let label_count = if config.show_column_labels && grid.is_drawable() {
        grid.cols
    } else {
        0
    };
    let (_, cell_height) = grid.cell_size(width, height);
    let font_px = cell_height * config.label_scale;
    let label_bottom = grid.first_row_height(height);
    let marker_color = config.marker_color;
    let marker_radius = config.marker_radius;

    let fill = std::iter::once(Drawable::Fill { color: background });

    let verticals = grid
        .vertical_lines(width)
        .map(move |x| Drawable::VerticalLine {
            x,
            height,
            color: line_color,
        });

    let horizontals = grid
        .horizontal_lines(height)
        .map(move |y| Drawable::HorizontalLine {
            y,
            width,
            color: line_color,
        });

    let labels = (0..label_count).map(move |i| {
        let (left, right) = grid.column_span(i, width);
        Drawable::ColumnLabel {
            text: (i + 1).to_string(),
            cell: Rect::new(left, 0, right, label_bottom),
            font_px,
            color: label_color,
        }
    });

    let dot = marker.filter(|_| grid.is_drawable()).map(|center| Drawable::Dot {
        center,
        radius: marker_radius,
        color: marker_color,
    });

    fill.chain(verticals).chain(horizontals).chain(labels).chain(dot)
}

/// Bold font used for column labels
pub struct LabelFont {
    font: FontVec,
}

impl LabelFont {
    /// Loads the first readable font from the system font directory
    pub fn load_system(file_names: &[&str]) -> Option<Self> {
        let fonts_dir = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("C:\\Windows"))
            .join("Fonts");

        for name in file_names {
            let path = fonts_dir.join(name);
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };
            match FontVec::try_from_vec(data) {
                Ok(font) => {
                    debug!(path = %path.display(), "label font loaded");
                    return Some(Self { font });
                }
                Err(err) => warn!(path = %path.display(), %err, "unusable label font"),
            }
        }

        warn!("no label font available, column labels disabled");
        None
    }
}

/// Rasterizer for drawing instructions
#[derive(Default)]
pub struct FrameRenderer {
    label_font: Option<LabelFont>,
}

impl FrameRenderer {
    pub fn new(label_font: Option<LabelFont>) -> Self {
        Self { label_font }
    }

    pub fn has_label_font(&self) -> bool {
        self.label_font.is_some()
    }

    /// Rasterizes one frame of the given size
    pub fn render<I>(&self, width: i32, height: i32, drawables: I) -> Result<Pixmap, RendererError>
    where
        I: IntoIterator<Item = Drawable>,
    {
        if width <= 0 || height <= 0 {
            return Err(RendererError::InvalidCanvas { width, height });
        }

        let mut pixmap =
            Pixmap::new(width as u32, height as u32).ok_or(RendererError::PixmapCreationFailed)?;

        for drawable in drawables {
            match drawable {
                Drawable::Fill { color } => pixmap.fill(to_skia(color)),
                Drawable::VerticalLine { x, height, color } => {
                    fill_rect(&mut pixmap, x as f32, 0.0, 1.0, height as f32, color);
                }
                Drawable::HorizontalLine { y, width, color } => {
                    fill_rect(&mut pixmap, 0.0, y as f32, width as f32, 1.0, color);
                }
                Drawable::ColumnLabel {
                    text,
                    cell,
                    font_px,
                    color,
                } => {
                    if let Some(font) = &self.label_font {
                        draw_label(&mut pixmap, &font.font, &text, cell, font_px, color);
                    }
                }
                Drawable::Dot {
                    center,
                    radius,
                    color,
                } => fill_circle(&mut pixmap, center, radius, color),
            }
        }

        Ok(pixmap)
    }
}

/// Converts the pixmap to the 32-bpp BGRA layout of a top-down DIB
pub fn to_bgra(pixmap: &Pixmap) -> Vec<u8> {
    let mut bgra = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        bgra.extend_from_slice(&[pixel.blue(), pixel.green(), pixel.red(), pixel.alpha()]);
    }
    bgra
}

fn to_skia(color: Rgb) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn solid_paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia(color));
    paint.anti_alias = false;
    paint
}

fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
    if let Some(rect) = SkiaRect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, &solid_paint(color), Transform::identity(), None);
    }
}

fn fill_circle(pixmap: &mut Pixmap, center: Point, radius: i32, color: Rgb) {
    if radius <= 0 {
        return;
    }
    if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) {
        pixmap.fill_path(
            &path,
            &solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Draws `text` centered in `cell`, blending glyph coverage onto the pixmap
fn draw_label(pixmap: &mut Pixmap, font: &FontVec, text: &str, cell: Rect, font_px: f32, color: Rgb) {
    if font_px <= 0.0 || !cell.is_valid() {
        return;
    }

    let scaled = font.as_scaled(PxScale::from(font_px));
    let text_width: f32 = text
        .chars()
        .map(|c| scaled.h_advance(scaled.glyph_id(c)))
        .sum();
    let text_height = scaled.ascent() - scaled.descent();

    let mut pen_x = cell.left as f32 + (cell.width() as f32 - text_width) / 2.0;
    let baseline = cell.top as f32 + (cell.height() as f32 - text_height) / 2.0 + scaled.ascent();

    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    let pixels = pixmap.pixels_mut();

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        let glyph = glyph_id.with_scale_and_position(font_px, point(pen_x, baseline));
        pen_x += scaled.h_advance(glyph_id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            // Hard threshold keeps the color key exact around glyph edges
            if coverage < 0.5 {
                return;
            }
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            if let Some(pixel) = PremultipliedColorU8::from_rgba(color.r, color.g, color.b, 255) {
                pixels[(y * width + x) as usize] = pixel;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::GridSpec;

    fn collect(width: i32, height: i32, mode: Mode, marker: Option<Point>) -> Vec<Drawable> {
        compute_drawables(width, height, mode, marker, &OverlayConfig::default()).collect()
    }

    fn rgb_at(pixmap: &Pixmap, x: u32, y: u32) -> Rgb {
        let pixel = pixmap.pixel(x, y).expect("pixel in bounds");
        Rgb::new(pixel.red(), pixel.green(), pixel.blue())
    }

    #[test]
    fn background_depends_on_mode() {
        let config = OverlayConfig::default();
        let locked = collect(800, 500, Mode::Locked, None);
        let edit = collect(800, 500, Mode::Edit, None);
        assert_eq!(locked[0], Drawable::Fill { color: config.color_key });
        assert_eq!(edit[0], Drawable::Fill { color: config.edit_background });
    }

    #[test]
    fn grid_lines_follow_truncated_cell_boundaries() {
        let drawables = collect(1005, 500, Mode::Locked, None);
        let xs: Vec<i32> = drawables
            .iter()
            .filter_map(|d| match d {
                Drawable::VerticalLine { x, height, .. } => {
                    assert_eq!(*height, 500);
                    Some(*x)
                }
                _ => None,
            })
            .collect();
        let ys: Vec<i32> = drawables
            .iter()
            .filter_map(|d| match d {
                Drawable::HorizontalLine { y, width, .. } => {
                    assert_eq!(*width, 1005);
                    Some(*y)
                }
                _ => None,
            })
            .collect();

        assert_eq!(xs, vec![100, 201, 301, 402, 502, 603, 703, 804, 904]);
        assert_eq!(ys, vec![83, 166, 250, 333, 416]);
    }

    #[test]
    fn column_labels_are_one_based_and_in_top_row() {
        let drawables = collect(800, 600, Mode::Locked, None);
        let labels: Vec<(String, Rect, f32)> = drawables
            .into_iter()
            .filter_map(|d| match d {
                Drawable::ColumnLabel {
                    text, cell, font_px, ..
                } => Some((text, cell, font_px)),
                _ => None,
            })
            .collect();

        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0].0, "1");
        assert_eq!(labels[9].0, "10");
        assert_eq!(labels[0].1, Rect::new(0, 0, 80, 100));
        assert_eq!(labels[9].1, Rect::new(720, 0, 800, 100));
        assert!((labels[0].2 - 60.0).abs() < 1e-3);
    }

    #[test]
    fn labels_can_be_disabled() {
        let config = OverlayConfig {
            show_column_labels: false,
            ..OverlayConfig::default()
        };
        let count = compute_drawables(800, 600, Mode::Edit, None, &config)
            .filter(|d| matches!(d, Drawable::ColumnLabel { .. }))
            .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn marker_drawn_in_both_modes() {
        let config = OverlayConfig::default();
        for mode in [Mode::Locked, Mode::Edit] {
            let drawables = collect(800, 600, mode, Some(Point::new(150, 75)));
            assert_eq!(
                drawables.last(),
                Some(&Drawable::Dot {
                    center: Point::new(150, 75),
                    radius: 5,
                    color: config.marker_color,
                })
            );
        }
    }

    #[test]
    fn no_marker_no_dot() {
        let drawables = collect(800, 600, Mode::Edit, None);
        assert!(!drawables.iter().any(|d| matches!(d, Drawable::Dot { .. })));
        // fill + 9 vertical + 5 horizontal + 10 labels
        assert_eq!(drawables.len(), 25);
    }

    #[test]
    fn degenerate_grid_draws_only_background() {
        let config = OverlayConfig {
            grid: GridSpec::new(0, 6),
            ..OverlayConfig::default()
        };
        for marker in [None, Some(Point::new(10, 10))] {
            let drawables: Vec<Drawable> =
                compute_drawables(800, 600, Mode::Locked, marker, &config).collect();
            assert_eq!(drawables, vec![Drawable::Fill { color: config.color_key }]);
        }
    }

    #[test]
    fn drawables_are_restartable() {
        let first = collect(640, 480, Mode::Edit, Some(Point::new(1, 1)));
        let second = collect(640, 480, Mode::Edit, Some(Point::new(1, 1)));
        assert_eq!(first, second);
    }

    #[test]
    fn rasterized_locked_frame_keeps_exact_color_key() {
        let config = OverlayConfig::default();
        let renderer = FrameRenderer::new(None);
        let pixmap = renderer
            .render(800, 600, compute_drawables(800, 600, Mode::Locked, None, &config))
            .unwrap();

        assert_eq!(rgb_at(&pixmap, 5, 5), config.color_key);
        assert_eq!(rgb_at(&pixmap, 80, 250), config.grid_line_color);
        assert_eq!(rgb_at(&pixmap, 81, 250), config.color_key);
        assert_eq!(rgb_at(&pixmap, 79, 250), config.color_key);
        assert_eq!(rgb_at(&pixmap, 400, 100), config.grid_line_color);
        assert_eq!(rgb_at(&pixmap, 300, 101), config.color_key);
        assert_eq!(rgb_at(&pixmap, 400, 101), config.grid_line_color);
    }

    #[test]
    fn rasterized_marker_is_solid() {
        let config = OverlayConfig::default();
        let renderer = FrameRenderer::new(None);
        let marker = Some(Point::new(150, 75));
        let pixmap = renderer
            .render(800, 600, compute_drawables(800, 600, Mode::Edit, marker, &config))
            .unwrap();

        assert_eq!(rgb_at(&pixmap, 150, 75), config.marker_color);
        assert_eq!(rgb_at(&pixmap, 152, 76), config.marker_color);
        assert_eq!(rgb_at(&pixmap, 150, 90), config.edit_background);
    }

    #[test]
    fn invalid_canvas_is_rejected() {
        let renderer = FrameRenderer::default();
        assert!(renderer.render(0, 600, std::iter::empty()).is_err());
        assert!(renderer.render(800, -1, std::iter::empty()).is_err());
    }

    #[test]
    fn bgra_conversion_swaps_channels() {
        let config = OverlayConfig::default();
        let renderer = FrameRenderer::new(None);
        let pixmap = renderer
            .render(4, 3, [Drawable::Fill { color: config.color_key }])
            .unwrap();
        let bgra = to_bgra(&pixmap);

        assert_eq!(bgra.len(), 4 * 3 * 4);
        // Key color RGB(0, 0, 1) lands in the first byte
        assert_eq!(&bgra[..4], &[1, 0, 0, 255]);
    }

    #[test]
    fn missing_font_skips_labels() {
        let renderer = FrameRenderer::new(None);
        assert!(!renderer.has_label_font());
    }
}
