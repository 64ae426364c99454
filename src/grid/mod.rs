//! Struct-of-Arrays floe grid.
//!
//! Canonical state is `thickness` and `depth`. `head` and `total_water_level`
//! are derived from them and must be re-synced after any write to the
//! canonical fields; `melt` is carried between operations.

pub mod boundary;

use ndarray::{Array2, Zip};
use rayon::prelude::*;

use crate::error::{PondError, PondResult};

pub use boundary::{roll, wrap, EdgeBehavior, GridAxis, DIRECTIONS};

/// Co-located scalar fields on a uniform rectangular grid.
#[derive(Debug, Clone)]
pub struct FloeGrid {
    pub rows: usize,
    pub cols: usize,
    /// Grid spacing, identical in both directions [m]
    pub dx: f64,

    /// Floe thickness Ht [m]
    pub thickness: Array2<f64>,
    /// Pond depth h [m]
    pub depth: Array2<f64>,
    /// Hydraulic head ψ = Ht + h - H_ref [m]
    pub head: Array2<f64>,
    /// Isostatic total water level H [m]
    pub total_water_level: Array2<f64>,
    /// Last computed ice melt rate m [m/s]
    pub melt: Array2<f64>,
}

impl FloeGrid {
    pub fn new(rows: usize, cols: usize, dx: f64) -> Self {
        Self {
            rows,
            cols,
            dx,
            thickness: Array2::zeros((rows, cols)),
            depth: Array2::zeros((rows, cols)),
            head: Array2::zeros((rows, cols)),
            total_water_level: Array2::zeros((rows, cols)),
            melt: Array2::zeros((rows, cols)),
        }
    }

    /// Build a grid from copies of caller-owned thickness and depth fields.
    pub fn from_fields(thickness: &Array2<f64>, depth: &Array2<f64>, dx: f64) -> PondResult<Self> {
        let (rows, cols) = thickness.dim();
        if rows == 0 || cols == 0 {
            return Err(PondError::EmptyGrid { rows, cols });
        }
        check_shape("depth", depth, (rows, cols))?;

        let mut grid = Self::new(rows, cols, dx);
        grid.thickness.assign(thickness);
        grid.depth.assign(depth);
        Ok(grid)
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Area of one cell [m²].
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.dx * self.dx
    }

    /// Enforce ψ = Ht + h - H_ref. Call after any operation that writes
    /// thickness or depth.
    pub fn sync_head(&mut self, reference_head: f64) {
        Zip::from(&mut self.head)
            .and(&self.thickness)
            .and(&self.depth)
            .for_each(|psi, &ht, &h| *psi = ht + h - reference_head);
    }

    /// Finite difference `(neighbour - own) / dx` with the neighbour taken
    /// from `field` rolled by `shift` along `axis`.
    pub fn gradient(
        &self,
        field: &Array2<f64>,
        shift: isize,
        axis: GridAxis,
        edges: EdgeBehavior,
    ) -> Array2<f64> {
        gradient(field, shift, axis, self.dx, edges)
    }
}

/// Directional finite difference of `field`.
///
/// Cell `(r, c)` holds `(field[src] - field[r, c]) / dx` where `src` is the cell
/// whose value lands on `(r, c)` when `field` is rolled by `shift` along `axis`.
pub fn gradient(
    field: &Array2<f64>,
    shift: isize,
    axis: GridAxis,
    dx: f64,
    edges: EdgeBehavior,
) -> Array2<f64> {
    let dim = field.dim();
    Array2::from_shape_fn(dim, |cell| {
        let src = edges.source_cell(cell, shift, axis, dim);
        (field[src] - field[cell]) / dx
    })
}

/// Evaluate `f` for every cell of a `(rows, cols)` field in parallel.
///
/// Cells are independent, so `f` must only read frozen inputs.
pub(crate) fn par_cells<F>(dim: (usize, usize), f: F) -> PondResult<Array2<f64>>
where
    F: Fn((usize, usize)) -> f64 + Sync + Send,
{
    let (rows, cols) = dim;
    let cells: Vec<f64> = (0..rows * cols)
        .into_par_iter()
        .map(|idx| f((idx / cols, idx % cols)))
        .collect();
    let produced = cells.len();
    Array2::from_shape_vec(dim, cells).map_err(|_| PondError::ShapeMismatch {
        name: "cells",
        expected: dim,
        actual: (produced, 1),
    })
}

/// Fail with [`PondError::ShapeMismatch`] unless `field` has shape `expected`.
pub fn check_shape(
    name: &'static str,
    field: &Array2<f64>,
    expected: (usize, usize),
) -> PondResult<()> {
    let actual = field.dim();
    if actual != expected {
        return Err(PondError::ShapeMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

/// First non-finite cell of `field`, if any.
pub fn first_non_finite(field: &Array2<f64>) -> Option<(usize, usize)> {
    field
        .indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(idx, _)| idx)
}

/// Arithmetic mean of every cell.
#[inline]
pub fn field_mean(field: &Array2<f64>) -> f64 {
    field.sum() / field.len() as f64
}
