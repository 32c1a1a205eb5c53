//! Error types for grid operators.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Two grids (or parallel sequences) that must align do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A world-space location falls outside the grid extent.
    #[error("point ({x}, {y}) outside grid extent x={x_range:?} y={y_range:?}")]
    OutOfBounds {
        x: f64,
        y: f64,
        x_range: (f64, f64),
        y_range: (f64, f64),
    },

    #[error("grid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
