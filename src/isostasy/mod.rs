//! Isostatic balance of the floating floe.
//!
//! The total water level implied by the head is `H = ψ / (1 - ρ_ice/ρ_water)`.
//! Rebalancing applies one floe-wide thickness shift derived from the field
//! means and removes the floe wherever `H ≤ 0`.

use ndarray::{Array2, Zip};

use crate::config::PhysicalConstants;
use crate::error::PondResult;
use crate::grid::{check_shape, field_mean};

/// Total water level H from the hydraulic head.
pub fn total_water_level(head: &Array2<f64>, c: &PhysicalConstants) -> Array2<f64> {
    let divisor = c.isostatic_divisor();
    head.mapv(|psi| psi / divisor)
}

/// Uniform thickness shift `(mean(H) - mean(h)) / (ρ_ice/ρ_water + 1) - mean(Ht)`.
pub fn rebalance_offset(
    total_water_level: &Array2<f64>,
    depth: &Array2<f64>,
    thickness: &Array2<f64>,
    c: &PhysicalConstants,
) -> f64 {
    (field_mean(total_water_level) - field_mean(depth)) / (c.density_ratio() + 1.0)
        - field_mean(thickness)
}

/// `heaviside(H, 0) · (Ht + offset)`: shifted thickness where `H > 0`, zero elsewhere.
pub fn rebalance_thickness(
    thickness: &mut Array2<f64>,
    total_water_level: &Array2<f64>,
    offset: f64,
) -> PondResult<()> {
    check_shape("total_water_level", total_water_level, thickness.dim())?;
    Zip::from(thickness)
        .and(total_water_level)
        .for_each(|ht, &level| {
            *ht = if level > 0.0 {
                *ht + offset
            } else if level.is_nan() {
                f64::NAN
            } else {
                0.0
            };
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PondError;
    use ndarray::array;

    #[test]
    fn water_level_scales_head() {
        let c = PhysicalConstants::default();
        let head = array![[0.6, 0.8], [1.0, 1.2]];
        let level = total_water_level(&head, &c);
        for (h, psi) in level.iter().zip(head.iter()) {
            assert!((h - psi * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rebalance_zeroes_cells_without_floe() {
        let mut thickness = array![[1.0, 2.0], [3.0, 4.0]];
        let level = array![[1.0, 0.0], [-1.0, 2.0]];
        rebalance_thickness(&mut thickness, &level, 0.5).unwrap();
        assert_eq!(thickness, array![[1.5, 0.0], [0.0, 4.5]]);
    }

    #[test]
    fn rebalance_rejects_mismatched_level() {
        let mut thickness = array![[1.0, 2.0]];
        let err = rebalance_thickness(&mut thickness, &array![[1.0]], 0.5).unwrap_err();
        assert!(matches!(err, PondError::ShapeMismatch { name: "total_water_level", .. }));
        assert_eq!(thickness, array![[1.0, 2.0]]);
    }

    #[test]
    fn offset_from_means() {
        let c = PhysicalConstants::default();
        let level = array![[6.0, 8.0], [10.0, 12.0]];
        let depth = array![[0.1, 0.2], [0.3, 0.4]];
        let thickness = array![[0.5, 0.6], [0.7, 0.8]];
        let offset = rebalance_offset(&level, &depth, &thickness, &c);
        let expected = (9.0 - 0.25) / 1.9 - 0.65;
        assert!((offset - expected).abs() < 1e-12);
    }
}
