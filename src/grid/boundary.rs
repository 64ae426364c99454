//! Neighbour lookup policy at the grid edges.
//!
//! Every stencil in the model reads "the cell offset by `shift` along `axis`"
//! through [`EdgeBehavior::source_cell`], so the boundary treatment is swapped
//! in one place.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Grid axis: rows (axis 0) or columns (axis 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAxis {
    Rows,
    Cols,
}

/// The four von Neumann directions as (axis, shift), rows first, backward shift first.
///
/// Stencils sum their directional contributions in this order.
pub const DIRECTIONS: [(GridAxis, isize); 4] = [
    (GridAxis::Rows, -1),
    (GridAxis::Rows, 1),
    (GridAxis::Cols, -1),
    (GridAxis::Cols, 1),
];

/// How neighbour lookups behave past the grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeBehavior {
    /// Periodic (toroidal) wrap-around. The floe tile repeats in both directions.
    #[default]
    Wrap,
    /// Out-of-range neighbours resolve to the edge cell itself, giving a
    /// zero gradient (no-flux) across the edge.
    Clamp,
}

impl EdgeBehavior {
    /// Index along a line of `len` cells whose value lands at `index` when the
    /// line is rolled by `shift` (so `shift = 1` reads the cell one step behind).
    #[inline]
    pub fn neighbor(self, index: usize, shift: isize, len: usize) -> usize {
        let src = index as isize - shift;
        match self {
            EdgeBehavior::Wrap => wrap(src, len),
            EdgeBehavior::Clamp => src.clamp(0, len as isize - 1) as usize,
        }
    }

    /// Source cell for `(row, col)` after rolling a `(rows, cols)` field by
    /// `shift` along `axis`.
    #[inline]
    pub fn source_cell(
        self,
        (row, col): (usize, usize),
        shift: isize,
        axis: GridAxis,
        (rows, cols): (usize, usize),
    ) -> (usize, usize) {
        match axis {
            GridAxis::Rows => (self.neighbor(row, shift, rows), col),
            GridAxis::Cols => (row, self.neighbor(col, shift, cols)),
        }
    }
}

/// Wrap a coordinate into `[0, len)`.
#[inline]
pub fn wrap(coord: isize, len: usize) -> usize {
    let n = len as isize;
    ((coord % n + n) % n) as usize
}

/// Copy of `field` rolled by `shift` cells along `axis`.
pub fn roll(field: &Array2<f64>, shift: isize, axis: GridAxis, edges: EdgeBehavior) -> Array2<f64> {
    let dim = field.dim();
    Array2::from_shape_fn(dim, |cell| {
        let src = edges.source_cell(cell, shift, axis, dim);
        field[src]
    })
}
