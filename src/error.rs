//! Error type shared by every model operation.
//!
//! The model performs unconditional array arithmetic, so the only hard failures
//! are malformed shapes and invalid configuration. Non-finite values are an
//! error only when the caller opts into [`NonFinitePolicy::Reject`].
//!
//! [`NonFinitePolicy::Reject`]: crate::config::NonFinitePolicy::Reject

use thiserror::Error;

pub type PondResult<T> = Result<T, PondError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PondError {
    /// A field does not share the grid shape.
    #[error("shape mismatch for {name}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("invalid configuration value {key}={value}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("non-finite value in {field} at ({row}, {col})")]
    NonFinite {
        field: &'static str,
        row: usize,
        col: usize,
    },
}

impl PondError {
    pub(crate) fn config(key: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidConfig { key, value, reason }
    }
}
