//! Physical constants and model configuration.
//!
//! Constants are scoped to a model instance rather than global, so several
//! models with different physics (e.g. a density sensitivity sweep) can run
//! side by side.

use serde::{Deserialize, Serialize};

use crate::error::{PondError, PondResult};
use crate::grid::EdgeBehavior;

const SECONDS_PER_DAY: f64 = 3600.0 * 24.0;

/// Physical constants of the floe/pond system. SI units throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Gravitational acceleration g [m/s²]
    pub g: f64,
    /// Density of water [kg/m³]
    pub rho_water: f64,
    /// Density of ice [kg/m³]
    pub rho_ice: f64,
    /// Vertical seepage rate s [m/s]
    pub seepage_rate: f64,
    /// Horizontal permeability of sea ice π_h [m²]
    pub pi_h: f64,
    /// Dynamic viscosity of water μ [Pa·s]
    pub mu: f64,
    /// Melt rate of bare (unponded) ice m_i [m/s]
    pub m_i: f64,
    /// Additional melt rate under a saturated pond m_p [m/s]
    pub m_p: f64,
    /// Pond depth at which the melt enhancement saturates [m]
    pub h_max: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            g: 9.832,
            rho_water: 1000.0,
            rho_ice: 900.0,
            seepage_rate: 0.008 / SECONDS_PER_DAY,
            pi_h: 3e-9,
            mu: 0.00179,
            m_i: 0.012 / SECONDS_PER_DAY,
            m_p: 0.02 / SECONDS_PER_DAY,
            h_max: 0.1,
        }
    }
}

impl PhysicalConstants {
    /// rho_ice / rho_water
    #[inline]
    pub fn density_ratio(&self) -> f64 {
        self.rho_ice / self.rho_water
    }

    /// Denominator of the isostatic total-water-level relation, 1 - rho_ice/rho_water.
    #[inline]
    pub fn isostatic_divisor(&self) -> f64 {
        1.0 - self.density_ratio()
    }

    /// Lumped Darcy transmissivity dt·dx·g·ρ_w·π_h/μ used by the lateral flow solver.
    #[inline]
    pub fn darcy_transmissivity(&self, dt: f64, dx: f64) -> f64 {
        dt * dx * self.g * self.rho_water * self.pi_h / self.mu
    }

    /// Melt rate once pond depth exceeds `h_max`.
    #[inline]
    pub fn saturated_melt_rate(&self) -> f64 {
        (1.0 + self.m_p / self.m_i) * self.m_i
    }

    pub fn validate(&self) -> PondResult<()> {
        let fields = [
            ("g", self.g),
            ("rho_water", self.rho_water),
            ("rho_ice", self.rho_ice),
            ("seepage_rate", self.seepage_rate),
            ("pi_h", self.pi_h),
            ("mu", self.mu),
            ("m_i", self.m_i),
            ("m_p", self.m_p),
            ("h_max", self.h_max),
        ];
        for (key, value) in fields {
            if !value.is_finite() {
                return Err(PondError::config(key, value, "must be finite"));
            }
        }

        if self.g <= 0.0 {
            return Err(PondError::config("g", self.g, "must be positive"));
        }
        if self.rho_water <= 0.0 {
            return Err(PondError::config("rho_water", self.rho_water, "must be positive"));
        }
        if self.rho_ice <= 0.0 {
            return Err(PondError::config("rho_ice", self.rho_ice, "must be positive"));
        }
        // Ice lighter than water keeps the isostatic divisor strictly positive.
        if self.rho_ice >= self.rho_water {
            return Err(PondError::config(
                "rho_ice",
                self.rho_ice,
                "must be smaller than rho_water",
            ));
        }
        if self.mu <= 0.0 {
            return Err(PondError::config("mu", self.mu, "must be positive"));
        }
        if self.m_i <= 0.0 {
            return Err(PondError::config("m_i", self.m_i, "must be positive"));
        }
        if self.h_max <= 0.0 {
            return Err(PondError::config("h_max", self.h_max, "must be positive"));
        }
        if self.seepage_rate < 0.0 {
            return Err(PondError::config("seepage_rate", self.seepage_rate, "must not be negative"));
        }
        if self.pi_h < 0.0 {
            return Err(PondError::config("pi_h", self.pi_h, "must not be negative"));
        }
        Ok(())
    }
}

/// What to do with NaN/Inf cells in caller-supplied fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonFinitePolicy {
    /// Accept and let them flow through the arithmetic.
    #[default]
    Propagate,
    /// Fail with [`PondError::NonFinite`].
    Reject,
}

/// Full model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Time step [s]
    pub dt: f64,
    /// Grid spacing, uniform in both directions [m]
    pub dx: f64,
    pub constants: PhysicalConstants,
    /// Subtracted from thickness + depth when deriving the hydraulic head [m]
    pub reference_head: f64,
    pub edges: EdgeBehavior,
    pub non_finite: NonFinitePolicy,
    /// Clamp negative pond depth to zero inside [`PondModel::step`].
    ///
    /// [`PondModel::step`]: crate::model::PondModel::step
    pub clamp_depth: bool,
    /// Rebalance the floe every this many steps of [`PondModel::step`].
    ///
    /// [`PondModel::step`]: crate::model::PondModel::step
    pub rebalance_interval: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            dx: 1.0,
            constants: PhysicalConstants::default(),
            reference_head: 0.0,
            edges: EdgeBehavior::Wrap,
            non_finite: NonFinitePolicy::Propagate,
            clamp_depth: false,
            rebalance_interval: 1,
        }
    }
}

impl ModelConfig {
    pub fn new(dt: f64, dx: f64) -> Self {
        Self {
            dt,
            dx,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> PondResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(PondError::config("dt", self.dt, "must be finite and positive"));
        }
        if !self.dx.is_finite() || self.dx <= 0.0 {
            return Err(PondError::config("dx", self.dx, "must be finite and positive"));
        }
        if !self.reference_head.is_finite() {
            return Err(PondError::config(
                "reference_head",
                self.reference_head,
                "must be finite",
            ));
        }
        if self.rebalance_interval == 0 {
            return Err(PondError::config("rebalance_interval", 0.0, "must be at least 1"));
        }
        self.constants.validate()
    }
}
