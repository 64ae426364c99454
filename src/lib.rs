//! floe-ponds: cellular-automaton model of melt ponds on a floating sea-ice floe.
//!
//! Architecture:
//! - SoA floe grid (grid module) holding thickness, pond depth and the fields derived from them
//! - Explicit edge policy (grid::boundary) with periodic wrap-around by default
//! - Depth-dependent melt with neighbour widening of pond footprints (melt module)
//! - Meltwater input and vertical seepage (hydrology module)
//! - Upwinded Darcy flow between von Neumann neighbours (flow module)
//! - Floe-wide isostatic rebalancing (isostasy module)
//!
//! [`PondModel`] owns the state and exposes every operation separately; an
//! external driver owns the time loop, I/O and visualisation.
//!
//! ```no_run
//! use floe_ponds::PondModel;
//! use ndarray::Array2;
//!
//! let thickness = Array2::from_elem((64, 64), 1.5);
//! let depth = Array2::zeros((64, 64));
//! let mut model = PondModel::new(&thickness, &depth, 3600.0, 1.0)?;
//! for _ in 0..24 {
//!     let diag = model.step()?;
//!     println!("{}", diag);
//! }
//! # Ok::<(), floe_ponds::PondError>(())
//! ```

pub mod config;
pub mod diag;
pub mod error;
pub mod flow;
pub mod grid;
pub mod hydrology;
pub mod isostasy;
pub mod melt;
pub mod model;

pub use config::{ModelConfig, NonFinitePolicy, PhysicalConstants};
pub use diag::StepDiagnostics;
pub use error::{PondError, PondResult};
pub use grid::{EdgeBehavior, FloeGrid, GridAxis};
pub use model::PondModel;
