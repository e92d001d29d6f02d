//! Dense per-frame temperature grid.
//!
//! A `Grid` holds one completed thermal frame: `height * width` cells of
//! degrees-Celsius readings in row-major order. Row 0 is the bottom row of
//! the physical sensor; renderers must keep that origin convention.

/// Filler value for cells that received no valid reading during assembly.
///
/// Aggregation treats sentinel cells like ordinary data. See `assemble` for
/// when a completed frame can still contain zero-hit cells.
pub const MISSING_TEMP: f64 = 0.0;

/// One completed thermal frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<f64>,
}

impl Grid {
    /// Create a grid with every cell set to [`MISSING_TEMP`].
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![MISSING_TEMP; height * width],
        }
    }

    /// Build a grid from bottom-to-top rows. Rows must all have `width`
    /// cells; intended for tests and synthetic sources.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut grid = Self::new(height, width);
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "ragged row {} in grid literal", r);
            for (c, &temp) in row.iter().enumerate() {
                grid.set(r, c, temp);
            }
        }
        grid
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell count, `height * width`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn same_dims(&self, other: &Grid) -> bool {
        self.height == other.height && self.width == other.width
    }

    /// Read one cell. Panics if `row`/`col` are out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[self.index(row, col)]
    }

    /// Write one cell. Panics if `row`/`col` are out of range.
    pub fn set(&mut self, row: usize, col: usize, temp: f64) {
        let i = self.index(row, col);
        self.cells[i] = temp;
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Minimum and maximum cell values, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = self.cells.iter().copied();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for temp in iter {
            if temp < min {
                min = temp;
            }
            if temp > max {
                max = temp;
            }
        }
        Some((min, max))
    }

    /// Arithmetic mean over all cells, or `None` for an empty grid.
    pub fn mean(&self) -> Option<f64> {
        if self.cells.is_empty() {
            return None;
        }
        Some(self.cells.iter().sum::<f64>() / self.cells.len() as f64)
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "cell ({}, {}) out of range for {}x{} grid",
            row,
            col,
            self.height,
            self.width
        );
        row * self.width + col
    }
}
