//! Melt-rate engine.
//!
//! Bare ice melts at `m_i`. A pond deepens the melt linearly up to
//! `(1 + m_p/m_i)·m_i` at depth `h_max` and stays saturated beyond it. The
//! neighbour pass then widens each pond's footprint: a cell never melts slower
//! than an adjacent pond would make it melt.

use ndarray::Array2;

use crate::config::PhysicalConstants;
use crate::error::PondResult;
use crate::grid::{check_shape, par_cells, EdgeBehavior, DIRECTIONS};

/// Ice melt rate [m/s] under a pond of depth `depth`.
#[inline]
pub fn local_melt_rate(depth: f64, c: &PhysicalConstants) -> f64 {
    if depth > c.h_max {
        (1.0 + c.m_p / c.m_i) * c.m_i
    } else {
        (1.0 + c.m_p / c.m_i * depth / c.h_max) * c.m_i
    }
}

/// Per-cell melt rate from the local pond depth alone.
pub fn local_melt(depth: &Array2<f64>, c: &PhysicalConstants) -> Array2<f64> {
    depth.mapv(|h| local_melt_rate(h, c))
}

/// Neighbour-enhanced melt.
///
/// Each output cell is the maximum of its previous melt and the local melt
/// rate of each von Neumann neighbour's depth. Reads only `depth` and `melt`,
/// so the result never drops below `melt`.
pub fn melt_with_neighbors(
    depth: &Array2<f64>,
    melt: &Array2<f64>,
    c: &PhysicalConstants,
    edges: EdgeBehavior,
) -> PondResult<Array2<f64>> {
    let dim = depth.dim();
    check_shape("melt", melt, dim)?;
    par_cells(dim, |cell| {
        let mut best = melt[cell];
        for &(axis, shift) in DIRECTIONS.iter() {
            let src = edges.source_cell(cell, shift, axis, dim);
            let candidate = local_melt_rate(depth[src], c);
            if candidate > best {
                best = candidate;
            }
        }
        best
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PondError;
    use ndarray::array;

    #[test]
    fn bare_ice_melts_at_unponded_rate() {
        let c = PhysicalConstants::default();
        assert_eq!(local_melt_rate(0.0, &c), c.m_i);
    }

    #[test]
    fn ramp_meets_saturation_at_h_max() {
        let c = PhysicalConstants::default();
        let at_max = local_melt_rate(c.h_max, &c);
        assert!((at_max - c.saturated_melt_rate()).abs() < 1e-20);
        assert_eq!(local_melt_rate(0.2, &c), c.saturated_melt_rate());
        assert_eq!(local_melt_rate(5.0, &c), c.saturated_melt_rate());
    }

    #[test]
    fn ramp_is_linear_below_h_max() {
        let c = PhysicalConstants::default();
        let a = local_melt_rate(0.02, &c);
        let b = local_melt_rate(0.04, &c);
        let d = local_melt_rate(0.06, &c);
        assert!(((b - a) - (d - b)).abs() < 1e-20);
        assert!(b > a);
    }

    #[test]
    fn deep_neighbour_raises_dry_cell() {
        let c = PhysicalConstants::default();
        let depth = array![[0.0, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.0]];
        let melt = local_melt(&depth, &c);
        let enhanced = melt_with_neighbors(&depth, &melt, &c, EdgeBehavior::Wrap).unwrap();

        let sat = c.saturated_melt_rate();
        assert_eq!(enhanced[[0, 1]], sat);
        assert_eq!(enhanced[[1, 0]], sat);
        assert_eq!(enhanced[[1, 2]], sat);
        assert_eq!(enhanced[[2, 1]], sat);
        assert_eq!(enhanced[[1, 1]], sat);
        // diagonal cells are not von Neumann neighbours
        assert_eq!(enhanced[[0, 0]], c.m_i);
    }

    #[test]
    fn enhancement_wraps_around_edges() {
        let c = PhysicalConstants::default();
        let depth = array![[0.5, 0.0, 0.0, 0.0]];
        let melt = local_melt(&depth, &c);
        let enhanced = melt_with_neighbors(&depth, &melt, &c, EdgeBehavior::Wrap).unwrap();
        assert_eq!(enhanced[[0, 3]], c.saturated_melt_rate());
        assert_eq!(enhanced[[0, 2]], c.m_i);

        let clamped = melt_with_neighbors(&depth, &melt, &c, EdgeBehavior::Clamp).unwrap();
        assert_eq!(clamped[[0, 3]], c.m_i);
    }

    #[test]
    fn enhancement_never_lowers_previous_melt() {
        let c = PhysicalConstants::default();
        let depth = array![[0.1, 0.2], [0.3, 0.4]];
        let previous = Array2::from_elem((2, 2), 1.0);
        let enhanced = melt_with_neighbors(&depth, &previous, &c, EdgeBehavior::Wrap).unwrap();
        assert_eq!(enhanced, previous);
    }

    #[test]
    fn mismatched_melt_is_an_error() {
        let c = PhysicalConstants::default();
        let depth = Array2::zeros((2, 2));
        let err = melt_with_neighbors(&depth, &Array2::zeros((2, 3)), &c, EdgeBehavior::Wrap)
            .unwrap_err();
        assert!(matches!(err, PondError::ShapeMismatch { name: "melt", .. }));
    }
}
