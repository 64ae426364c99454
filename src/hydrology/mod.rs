//! Vertical pond water balance: meltwater input and seepage loss.
//!
//! Melted ice adds `melt · ρ_ice/ρ_water` of water per second; seepage through
//! the porous floe removes a constant `s`. Depth is not clamped here, so a
//! drying pond can go negative if seepage dominates.

use ndarray::{Array2, Zip};

use crate::config::PhysicalConstants;
use crate::error::PondResult;
use crate::grid::check_shape;

/// Pond depth after one step of melt input and seepage.
pub fn melt_drain(
    depth: &Array2<f64>,
    melt: &Array2<f64>,
    c: &PhysicalConstants,
    dt: f64,
) -> PondResult<Array2<f64>> {
    check_shape("melt", melt, depth.dim())?;
    let ratio = c.density_ratio();
    let seepage = c.seepage_rate;
    Ok(Zip::from(depth)
        .and(melt)
        .map_collect(|&h, &m| h + dt * (m * ratio - seepage)))
}

/// Clamp negative depths to zero in place. Returns how many cells were clamped.
pub fn clamp_negative_depth(depth: &mut Array2<f64>) -> usize {
    let mut clamped = 0;
    depth.map_inplace(|h| {
        if *h < 0.0 {
            *h = 0.0;
            clamped += 1;
        }
    });
    clamped
}
