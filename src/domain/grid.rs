//! Grid geometry calculations
//!
//! A grid divides a client area into `cols` x `rows` cells. Cell boundaries
//! are computed from a floating-point cell size and truncated to whole
//! pixels, so windows whose size is not a multiple of the grid dimensions
//! get slightly uneven cells.

/// Fixed grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: i32,
    pub rows: i32,
}

impl GridSpec {
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    /// Returns true if the grid has at least one column and one row
    pub fn is_drawable(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }

    /// Returns the real-valued cell size as (width, height)
    ///
    /// Returns (0.0, 0.0) for a grid that is not drawable.
    pub fn cell_size(&self, width: i32, height: i32) -> (f32, f32) {
        if !self.is_drawable() {
            return (0.0, 0.0);
        }
        (width as f32 / self.cols as f32, height as f32 / self.rows as f32)
    }

    /// X coordinates of the interior vertical lines, left to right
    ///
    /// Yields `cols - 1` values; the outer edges (i = 0 and i = cols) are
    /// never included.
    pub fn vertical_lines(self, width: i32) -> impl Iterator<Item = i32> {
        let (cell_width, _) = self.cell_size(width, 0);
        let count = if self.is_drawable() { self.cols } else { 0 };
        (1..count).map(move |i| boundary(i, cell_width))
    }

    /// Y coordinates of the interior horizontal lines, top to bottom
    pub fn horizontal_lines(self, height: i32) -> impl Iterator<Item = i32> {
        let (_, cell_height) = self.cell_size(0, height);
        let count = if self.is_drawable() { self.rows } else { 0 };
        (1..count).map(move |j| boundary(j, cell_height))
    }

    /// Pixel extent `(start, end)` of column `index`, using the line rounding
    pub fn column_span(&self, index: i32, width: i32) -> (i32, i32) {
        let (cell_width, _) = self.cell_size(width, 0);
        (boundary(index, cell_width), boundary(index + 1, cell_width))
    }

    /// Pixel height of the first row, using the line rounding
    pub fn first_row_height(&self, height: i32) -> i32 {
        let (_, cell_height) = self.cell_size(0, height);
        boundary(1, cell_height)
    }
}

/// Truncating cell boundary: `(i * cell) as i32`
fn boundary(index: i32, cell: f32) -> i32 {
    (index as f32 * cell) as i32
}
