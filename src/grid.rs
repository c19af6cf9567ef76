//! Grid geometry: partitions the non-padded interior of a camera frame
//! into `rows x cols` rectangular cells and maps pixel coordinates to
//! cell ids. The padding margin never yields a valid cell.

use std::fmt::Display;

/// A cell identifier, `(row, col)` with `0 <= row < rows` and
/// `0 <= col < cols`.
pub type CellId = (usize, usize);

/// A pixel-space position inside a frame.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Point {
    /// Horizontal coordinate, in pixels from the left edge.
    pub x: f64,
    /// Vertical coordinate, in pixels from the top edge.
    pub y: f64,
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// The cell partition of a frame. Cells tile the interior exactly, with
/// no overlap; the `padding` border on every side belongs to no cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    frame_width: f64,
    frame_height: f64,
    rows: usize,
    cols: usize,
    padding: f64,
}

impl Grid {
    /// Builds a grid over a `frame_width x frame_height` frame.
    ///
    /// Panics if a dimension, row count, or column count is zero, or if
    /// the padding leaves no usable interior.
    pub fn new(frame_width: f64, frame_height: f64, rows: usize, cols: usize, padding: f64) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        assert!(padding >= 0.0);
        assert!(
            frame_width > 2.0 * padding && frame_height > 2.0 * padding,
            "padding leaves no usable interior"
        );

        Self {
            frame_width,
            frame_height,
            rows,
            cols,
            padding,
        }
    }

    /// Number of rows in the partition.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the partition.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn cell_width(&self) -> f64 {
        (self.frame_width - 2.0 * self.padding) / self.cols as f64
    }

    fn cell_height(&self) -> f64 {
        (self.frame_height - 2.0 * self.padding) / self.rows as f64
    }

    /// Maps a pixel position to the cell that contains it, or `None` for
    /// points inside the padding margin or outside the frame entirely.
    /// Points exactly on a cell edge resolve by floor semantics.
    pub fn locate_point(&self, point: Point) -> Option<CellId> {
        let Point { x, y } = point;

        if x < self.padding || y < self.padding {
            return None;
        }
        if x >= self.frame_width - self.padding || y >= self.frame_height - self.padding {
            return None;
        }

        let row = ((y - self.padding) / self.cell_height()) as usize;
        let col = ((x - self.padding) / self.cell_width()) as usize;

        // Float division can land exactly on the far boundary.
        Some((row.min(self.rows - 1), col.min(self.cols - 1)))
    }

    /// The pixel rectangle of a cell, as its top-left (inclusive) and
    /// bottom-right (exclusive) corners. Exact inverse of
    /// [`locate_point`](Self::locate_point).
    pub fn region(&self, cell: CellId) -> (Point, Point) {
        let (row, col) = cell;
        assert!(row < self.rows && col < self.cols, "cell id out of range");

        let top_left = Point {
            x: self.padding + col as f64 * self.cell_width(),
            y: self.padding + row as f64 * self.cell_height(),
        };
        let bottom_right = Point {
            x: top_left.x + self.cell_width(),
            y: top_left.y + self.cell_height(),
        };

        (top_left, bottom_right)
    }

    /// Replaces the partition parameters. Callers that are actively
    /// accumulating dwell time must not invoke this; the tracker guards
    /// against it.
    pub fn reconfigure(&mut self, rows: usize, cols: usize, padding: f64) {
        *self = Grid::new(self.frame_width, self.frame_height, rows, cols, padding);
    }
}
