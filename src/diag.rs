//! Per-step summary statistics of the floe and its ponds.

use std::fmt;

use crate::grid::{field_mean, FloeGrid};

/// Snapshot taken after a model step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiagnostics {
    pub step: u64,
    /// Simulated time since construction [s]
    pub time: f64,
    pub mean_thickness: f64,
    pub mean_depth: f64,
    pub max_depth: f64,
    /// Share of cells holding a pond (depth > 0)
    pub pond_fraction: f64,
    /// Total pond water volume [m³]
    pub water_volume: f64,
    /// Total ice volume [m³]
    pub ice_volume: f64,
    pub mean_melt: f64,
}

impl fmt::Display for StepDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[step {:>6}] t={:.0}s  Ht={:.4}m  h={:.4}/{:.4}m  ponded={:.1}%  \
             water={:.3}m³  ice={:.3}m³  melt={:.3e}m/s",
            self.step,
            self.time,
            self.mean_thickness,
            self.mean_depth,
            self.max_depth,
            self.pond_fraction * 100.0,
            self.water_volume,
            self.ice_volume,
            self.mean_melt,
        )
    }
}

pub fn collect_diagnostics(grid: &FloeGrid, step: u64, time: f64) -> StepDiagnostics {
    let n = grid.len() as f64;
    let area = grid.cell_area();
    let ponded = grid.depth.iter().filter(|&&h| h > 0.0).count();

    StepDiagnostics {
        step,
        time,
        mean_thickness: field_mean(&grid.thickness),
        mean_depth: field_mean(&grid.depth),
        max_depth: grid.depth.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        pond_fraction: ponded as f64 / n,
        water_volume: grid.depth.sum() * area,
        ice_volume: grid.thickness.sum() * area,
        mean_melt: field_mean(&grid.melt),
    }
}
