//! Lateral (Darcy) redistribution of pond water through the porous floe.
//!
//! For each of the four von Neumann directions the head gradient towards the
//! neighbour drives a flux `K · grad · h_source`, with `K` the lumped Darcy
//! transmissivity. The source reservoir is upwinded: water flowing in is
//! bounded by the neighbour's depth, water flowing out by the cell's own depth.
//!
//! The sweep is a Jacobi stencil. Every cell reads the frozen `head` and
//! `depth` snapshots, so cells are computed independently in parallel and the
//! result matches the serial formula bit for bit.

use ndarray::{Array2, Zip};

use crate::error::PondResult;
use crate::grid::{check_shape, par_cells, EdgeBehavior, DIRECTIONS};

/// Net lateral depth change for one step. `depth` is left untouched.
pub fn horizontal_flow(
    head: &Array2<f64>,
    depth: &Array2<f64>,
    transmissivity: f64,
    dx: f64,
    edges: EdgeBehavior,
) -> PondResult<Array2<f64>> {
    let dim = head.dim();
    check_shape("depth", depth, dim)?;
    par_cells(dim, |cell| {
        let own_head = head[cell];
        let mut acc = 0.0;
        for &(axis, shift) in DIRECTIONS.iter() {
            let src = edges.source_cell(cell, shift, axis, dim);
            let grad = (head[src] - own_head) / dx;
            if grad > 0.0 {
                acc += transmissivity * grad * depth[src];
            } else if grad < 0.0 {
                acc += transmissivity * grad * depth[cell];
            }
        }
        acc
    })
}

/// Add a lateral depth change to `depth` in place.
pub fn apply_flow(depth: &mut Array2<f64>, delta: &Array2<f64>) -> PondResult<()> {
    check_shape("delta", delta, depth.dim())?;
    Zip::from(depth).and(delta).for_each(|h, &dh| *h += dh);
    Ok(())
}
