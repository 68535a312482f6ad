//! Core domain types and operations
//!
//! This module defines pure geometric types in real pixels with no
//! knowledge of Win32 structures. The platform layer converts at the edge.

/// Axis-aligned rectangle in integer pixel coordinates
///
/// Uses edge coordinates (left, top, right, bottom) because that is the
/// shape both the window manager and the persisted settings record use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Creates a new rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Returns true if the rectangle has a positive extent on both axes
    /// and both extents fit in an i32
    pub fn is_valid(&self) -> bool {
        self.right > self.left
            && self.bottom > self.top
            && self.right.checked_sub(self.left).is_some()
            && self.bottom.checked_sub(self.top).is_some()
    }
}

/// Point in window-client pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Opaque 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(100, 100, 900, 600);
        assert_eq!(rect.width(), 800);
        assert_eq!(rect.height(), 500);
        assert!(rect.is_valid());
    }

    #[test]
    fn degenerate_rects_are_invalid() {
        assert!(!Rect::new(10, 10, 10, 20).is_valid()); // Zero width
        assert!(!Rect::new(10, 10, 20, 10).is_valid()); // Zero height
        assert!(!Rect::new(20, 20, 10, 10).is_valid()); // Inverted
    }

    #[test]
    fn overflowing_extents_are_invalid() {
        assert!(!Rect::new(i32::MIN, 0, i32::MAX, 10).is_valid());
        assert!(!Rect::new(0, -2, 10, i32::MAX).is_valid());
        assert!(Rect::new(-1, 0, i32::MAX - 1, 10).is_valid());
        assert_eq!(Rect::new(-1, 0, i32::MAX - 1, 10).width(), i32::MAX);
    }
}
