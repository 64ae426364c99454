//! The pond-evolution model.
//!
//! `PondModel` owns a [`FloeGrid`] and its configuration. Canonical state
//! (`thickness`, `depth`) is only written through methods that re-derive the
//! head and total water level immediately afterwards, so the derived fields
//! can never drift from the state they describe.
//!
//! Typical time step, as composed by [`PondModel::step`]:
//!
//! 1. [`refresh_melt`](PondModel::refresh_melt) and
//!    [`melt_with_neighbors`](PondModel::melt_with_neighbors)
//! 2. [`melt_drain`](PondModel::melt_drain)
//! 3. [`horizontal_flow`](PondModel::horizontal_flow) then
//!    [`apply_depth_change`](PondModel::apply_depth_change)
//! 4. [`rebalance_floe`](PondModel::rebalance_floe) every `rebalance_interval` steps

use log::{debug, info, trace, warn};
use ndarray::Array2;

use crate::config::{ModelConfig, NonFinitePolicy, PhysicalConstants};
use crate::diag::{collect_diagnostics, StepDiagnostics};
use crate::error::{PondError, PondResult};
use crate::grid::{check_shape, first_non_finite, FloeGrid, GridAxis};
use crate::{flow, hydrology, isostasy, melt};

#[derive(Debug, Clone)]
pub struct PondModel {
    config: ModelConfig,
    grid: FloeGrid,
    steps: u64,
}

impl PondModel {
    /// Model with default physical constants.
    pub fn new(thickness: &Array2<f64>, depth: &Array2<f64>, dt: f64, dx: f64) -> PondResult<Self> {
        Self::with_config(thickness, depth, ModelConfig::new(dt, dx))
    }

    /// Model from copies of `thickness` and `depth` and a full configuration.
    pub fn with_config(
        thickness: &Array2<f64>,
        depth: &Array2<f64>,
        config: ModelConfig,
    ) -> PondResult<Self> {
        config.validate()?;
        let grid = FloeGrid::from_fields(thickness, depth, config.dx)?;
        let mut model = Self {
            config,
            grid,
            steps: 0,
        };
        model.screen("thickness", thickness)?;
        model.screen("depth", depth)?;

        model.sync_derived();
        model.grid.melt = melt::local_melt(&model.grid.depth, &model.config.constants);

        debug!(
            "pond model {}x{} dt={}s dx={}m edges={:?}",
            model.grid.rows, model.grid.cols, model.config.dt, model.config.dx, model.config.edges,
        );
        Ok(model)
    }

    // --- State access ---

    pub fn thickness(&self) -> &Array2<f64> {
        &self.grid.thickness
    }

    pub fn depth(&self) -> &Array2<f64> {
        &self.grid.depth
    }

    pub fn head(&self) -> &Array2<f64> {
        &self.grid.head
    }

    pub fn total_water_level(&self) -> &Array2<f64> {
        &self.grid.total_water_level
    }

    pub fn melt(&self) -> &Array2<f64> {
        &self.grid.melt
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.config.constants
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn dx(&self) -> f64 {
        self.config.dx
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Number of completed [`step`](Self::step) calls.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time covered by [`step`](Self::step) [s].
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.config.dt
    }

    // --- Canonical state writes ---

    pub fn set_thickness(&mut self, thickness: &Array2<f64>) -> PondResult<()> {
        check_shape("thickness", thickness, self.shape())?;
        self.screen("thickness", thickness)?;
        self.grid.thickness.assign(thickness);
        self.sync_derived();
        Ok(())
    }

    pub fn set_depth(&mut self, depth: &Array2<f64>) -> PondResult<()> {
        check_shape("depth", depth, self.shape())?;
        self.screen("depth", depth)?;
        self.grid.depth.assign(depth);
        self.sync_derived();
        Ok(())
    }

    /// Overwrite the stored melt field, e.g. to seed the neighbour pass.
    pub fn set_melt(&mut self, melt: &Array2<f64>) -> PondResult<()> {
        check_shape("melt", melt, self.shape())?;
        self.screen("melt", melt)?;
        self.grid.melt.assign(melt);
        Ok(())
    }

    /// Change the head reference level and re-derive the head.
    pub fn set_reference_head(&mut self, reference_head: f64) -> PondResult<()> {
        if !reference_head.is_finite() {
            return Err(PondError::InvalidConfig {
                key: "reference_head",
                value: reference_head,
                reason: "must be finite",
            });
        }
        self.config.reference_head = reference_head;
        self.sync_derived();
        Ok(())
    }

    // --- Hydraulic head ---

    /// Recompute ψ = Ht + h - H_ref and return it.
    pub fn compute_head(&mut self) -> &Array2<f64> {
        self.grid.sync_head(self.config.reference_head);
        &self.grid.head
    }

    /// Directional finite difference of `field` with this model's spacing and edges.
    pub fn gradient(&self, field: &Array2<f64>, shift: isize, axis: GridAxis) -> Array2<f64> {
        self.grid.gradient(field, shift, axis, self.config.edges)
    }

    // --- Melt ---

    /// Melt rate from each cell's own pond depth. Does not touch the stored melt.
    pub fn local_melt(&self) -> Array2<f64> {
        melt::local_melt(&self.grid.depth, &self.config.constants)
    }

    /// Store the local melt rate as the current melt field.
    pub fn refresh_melt(&mut self) -> &Array2<f64> {
        self.grid.melt = self.local_melt();
        &self.grid.melt
    }

    /// Raise the stored melt to the local melt rate of each neighbouring pond.
    pub fn melt_with_neighbors(&mut self) -> PondResult<&Array2<f64>> {
        trace!("neighbour-enhanced melt");
        self.grid.melt = melt::melt_with_neighbors(
            &self.grid.depth,
            &self.grid.melt,
            &self.config.constants,
            self.config.edges,
        )?;
        Ok(&self.grid.melt)
    }

    // --- Vertical water balance ---

    /// Add meltwater from the stored melt field and remove seepage. Returns the new depth.
    pub fn melt_drain(&mut self) -> PondResult<&Array2<f64>> {
        trace!("melt and drain");
        self.grid.depth = hydrology::melt_drain(
            &self.grid.depth,
            &self.grid.melt,
            &self.config.constants,
            self.config.dt,
        )?;
        self.sync_derived();
        Ok(&self.grid.depth)
    }

    // --- Lateral flow ---

    /// Net lateral depth change from Darcy flow along head gradients.
    /// Does not modify the model; see [`apply_depth_change`](Self::apply_depth_change).
    pub fn horizontal_flow(&self) -> PondResult<Array2<f64>> {
        trace!("horizontal flow");
        let k = self
            .config
            .constants
            .darcy_transmissivity(self.config.dt, self.config.dx);
        flow::horizontal_flow(
            &self.grid.head,
            &self.grid.depth,
            k,
            self.config.dx,
            self.config.edges,
        )
    }

    /// Add `delta` to the pond depth and re-derive the head.
    pub fn apply_depth_change(&mut self, delta: &Array2<f64>) -> PondResult<()> {
        flow::apply_flow(&mut self.grid.depth, delta)?;
        self.sync_derived();
        Ok(())
    }

    // --- Isostasy ---

    /// Recompute the isostatic total water level from the head and return it.
    pub fn calc_total_water_level(&mut self) -> &Array2<f64> {
        self.grid.total_water_level =
            isostasy::total_water_level(&self.grid.head, &self.config.constants);
        &self.grid.total_water_level
    }

    /// Floe-wide thickness shift the next rebalance would apply.
    pub fn rebalance_offset(&self) -> f64 {
        isostasy::rebalance_offset(
            &self.grid.total_water_level,
            &self.grid.depth,
            &self.grid.thickness,
            &self.config.constants,
        )
    }

    /// Shift all thickness by the rebalance offset and drop the floe where H ≤ 0.
    /// Returns the applied offset.
    pub fn rebalance_floe(&mut self) -> PondResult<f64> {
        let offset = self.rebalance_offset();
        isostasy::rebalance_thickness(
            &mut self.grid.thickness,
            &self.grid.total_water_level,
            offset,
        )?;
        self.sync_derived();
        debug!("rebalanced floe by {:.6}m", offset);
        Ok(offset)
    }

    // --- Stepping ---

    /// Advance one full time step and report diagnostics.
    pub fn step(&mut self) -> PondResult<StepDiagnostics> {
        self.refresh_melt();
        self.melt_with_neighbors()?;
        self.melt_drain()?;

        let delta = self.horizontal_flow()?;
        flow::apply_flow(&mut self.grid.depth, &delta)?;

        if self.config.clamp_depth {
            let clamped = hydrology::clamp_negative_depth(&mut self.grid.depth);
            if clamped > 0 {
                warn!("clamped {} cells of negative pond depth", clamped);
            }
        }
        self.sync_derived();

        self.steps += 1;
        if self.steps % self.config.rebalance_interval as u64 == 0 {
            self.rebalance_floe()?;
        }

        let diag = collect_diagnostics(&self.grid, self.steps, self.time());
        info!("{}", diag);
        Ok(diag)
    }

    /// Snapshot of the current state without stepping.
    pub fn diagnostics(&self) -> StepDiagnostics {
        collect_diagnostics(&self.grid, self.steps, self.time())
    }

    fn sync_derived(&mut self) {
        self.compute_head();
        self.calc_total_water_level();
    }

    /// Apply the non-finite policy to a caller-supplied field.
    fn screen(&self, field: &'static str, values: &Array2<f64>) -> PondResult<()> {
        if let Some((row, col)) = first_non_finite(values) {
            match self.config.non_finite {
                NonFinitePolicy::Reject => {
                    return Err(PondError::NonFinite { field, row, col });
                }
                NonFinitePolicy::Propagate => {
                    warn!("non-finite {} at ({}, {}) will propagate", field, row, col);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> PondModel {
        PondModel::new(
            &array![[0.5, 0.6], [0.7, 0.8]],
            &array![[0.1, 0.2], [0.3, 0.4]],
            0.01,
            0.1,
        )
        .unwrap()
    }

    #[test]
    fn construction_derives_every_field() {
        let model = sample();
        assert_eq!(model.head(), &(model.thickness() + model.depth()));
        let expected_level = model.head().mapv(|psi| psi / model.constants().isostatic_divisor());
        assert_eq!(model.total_water_level(), &expected_level);
        assert_eq!(model.melt(), &model.local_melt());
        assert_eq!(model.steps(), 0);
    }

    #[test]
    fn setters_resync_head() {
        let mut model = sample();
        model.set_depth(&Array2::zeros((2, 2))).unwrap();
        assert_eq!(model.head(), model.thickness());

        model.set_thickness(&Array2::from_elem((2, 2), 2.0)).unwrap();
        assert!(model.head().iter().all(|&psi| psi == 2.0));
        assert!(model.total_water_level().iter().all(|&h| h == 2.0 / model.constants().isostatic_divisor()));
    }

    #[test]
    fn setters_reject_wrong_shape() {
        let mut model = sample();
        let err = model.set_depth(&Array2::zeros((3, 2))).unwrap_err();
        assert!(matches!(err, PondError::ShapeMismatch { name: "depth", .. }));
        let err = model.apply_depth_change(&Array2::zeros((2, 1))).unwrap_err();
        assert!(matches!(err, PondError::ShapeMismatch { name: "delta", .. }));
    }

    #[test]
    fn reference_head_is_subtracted() {
        let mut model = sample();
        model.set_reference_head(0.5).unwrap();
        let expected = model.thickness() + model.depth() - 0.5;
        assert_eq!(model.head(), &expected);
        assert!(model.set_reference_head(f64::INFINITY).is_err());
    }

    #[test]
    fn reject_policy_refuses_nan() {
        let config = ModelConfig {
            non_finite: NonFinitePolicy::Reject,
            ..ModelConfig::new(1.0, 1.0)
        };
        let err = PondModel::with_config(
            &array![[1.0, f64::NAN]],
            &array![[0.0, 0.0]],
            config,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PondError::NonFinite {
                field: "thickness",
                row: 0,
                col: 1,
            }
        );
    }

    #[test]
    fn propagate_policy_keeps_nan() {
        let model = PondModel::new(&array![[1.0, f64::NAN]], &array![[0.0, 0.0]], 1.0, 1.0).unwrap();
        assert!(model.head()[[0, 1]].is_nan());
    }

    #[test]
    fn apply_depth_change_updates_head() {
        let mut model = sample();
        let delta = model.horizontal_flow().unwrap();
        let expected_depth = model.depth() + &delta;
        model.apply_depth_change(&delta).unwrap();
        assert_eq!(model.depth(), &expected_depth);
        assert_eq!(model.head(), &(model.thickness() + model.depth()));
    }

    #[test]
    fn step_counts_and_clamps() {
        let config = ModelConfig {
            clamp_depth: true,
            rebalance_interval: 2,
            ..ModelConfig::new(86_400.0, 1.0)
        };
        let mut model = PondModel::with_config(
            &Array2::from_elem((3, 3), 1.5),
            &Array2::zeros((3, 3)),
            config,
        )
        .unwrap();

        let first = model.step().unwrap();
        assert_eq!(first.step, 1);
        assert_eq!(first.time, 86_400.0);
        assert!(model.depth().iter().all(|&h| h >= 0.0));
        // no rebalance yet: uniform bare ice keeps its thickness
        assert!(model.thickness().iter().all(|&ht| ht == 1.5));

        let before = model.thickness()[[0, 0]];
        let offset = model.rebalance_offset();
        model.step().unwrap();
        assert_eq!(model.steps(), 2);
        assert_ne!(model.thickness()[[0, 0]], before);
        assert!(offset.is_finite());
    }
}
