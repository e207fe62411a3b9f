// bicycle_core/src/types.rs

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{check_dim, ModelError, Result};

// --- Core Type Aliases ---
pub type State = DVector<f64>;
pub type Control = DVector<f64>;
pub type Observation = DVector<f64>;

/// Number of entries in a control vector: `[steering_angle, acceleration]`.
pub const CONTROL_DIM: usize = 2;

/// Typed view of a control vector `u = [steering_angle, acceleration]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInput {
    /// Front wheel steering angle (radians).
    pub steering_angle: f64,
    /// Commanded longitudinal acceleration (m/s^2).
    pub acceleration: f64,
}

impl ControlInput {
    pub fn new(steering_angle: f64, acceleration: f64) -> Self {
        Self {
            steering_angle,
            acceleration,
        }
    }

    /// Reads a control vector, rejecting anything that is not exactly two entries long.
    pub fn from_vector(u: &Control) -> Result<Self> {
        check_dim("control vector", CONTROL_DIM, u.nrows())?;
        Ok(Self::new(u[0], u[1]))
    }

    pub fn to_vector(self) -> Control {
        Control::from_vec(vec![self.steering_angle, self.acceleration])
    }
}

/// Axle placement relative to the center of gravity. Fixed for a given vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct VehicleGeometry {
    cg_to_front: f64,
    cg_to_rear: f64,
}

impl VehicleGeometry {
    pub fn new(cg_to_front: f64, cg_to_rear: f64) -> Result<Self> {
        let valid = |d: f64| d.is_finite() && d > 0.0;
        if !valid(cg_to_front) || !valid(cg_to_rear) {
            return Err(ModelError::InvalidGeometry {
                cg_to_front,
                cg_to_rear,
            });
        }
        Ok(Self {
            cg_to_front,
            cg_to_rear,
        })
    }

    /// Distance from the center of gravity to the front axle (meters).
    pub fn cg_to_front(&self) -> f64 {
        self.cg_to_front
    }

    /// Distance from the center of gravity to the rear axle (meters).
    pub fn cg_to_rear(&self) -> f64 {
        self.cg_to_rear
    }

    pub fn wheelbase(&self) -> f64 {
        self.cg_to_front + self.cg_to_rear
    }

    /// Fraction of the wheelbase ahead of the center of gravity, `L_f / (L_f + L_r)`.
    pub fn front_ratio(&self) -> f64 {
        self.cg_to_front / self.wheelbase()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGeometry {
    cg_to_front: f64,
    cg_to_rear: f64,
}

impl TryFrom<RawGeometry> for VehicleGeometry {
    type Error = ModelError;

    fn try_from(raw: RawGeometry) -> Result<Self> {
        Self::new(raw.cg_to_front, raw.cg_to_rear)
    }
}

/// Rejects negative, NaN and infinite timesteps.
pub(crate) fn check_timestep(dt: f64) -> Result<()> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidTimestep(dt))
    }
}
