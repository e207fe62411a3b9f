// bicycle_core/src/error.rs

use thiserror::Error;

use crate::layout::StateLayout;

/// Everything that can go wrong when building or evaluating a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The raw sensor-mode value does not name a known sensor suite.
    #[error("invalid sensor mode {0}, expected one of 1 (GPS+IMU+Encoder), 2 (IMU+Encoder), 3 (GPS), 4 (GPS+Encoder)")]
    InvalidSensorMode(u8),

    #[error("{what} has {actual} elements, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Axle distances must be finite and strictly positive.
    #[error("invalid vehicle geometry: cg_to_front = {cg_to_front}, cg_to_rear = {cg_to_rear}")]
    InvalidGeometry { cg_to_front: f64, cg_to_rear: f64 },

    #[error("invalid timestep {0}, must be finite and non-negative")]
    InvalidTimestep(f64),

    /// A look-ahead horizon was set for a layout without a look-ahead block.
    #[error("look_ahead_dt = {look_ahead_dt} has no effect on the {layout} layout")]
    UnusedLookAhead {
        layout: StateLayout,
        look_ahead_dt: f64,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Checks that a vector has the length a model expects.
pub(crate) fn check_dim(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
