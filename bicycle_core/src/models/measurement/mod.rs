// bicycle_core/src/models/measurement/mod.rs

use crate::error::Result;
use crate::layout::StateVariable;
use crate::sensors::SensorMode;
use crate::types::{Control, Observation, State};
use dyn_clone::DynClone;
use nalgebra::DMatrix;
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of the active sensor suite. `z = h(x) + v`
pub trait MeasurementModel: DynClone + Debug + Send + Sync {
    /// Describes the layout of the measurement vector `z` for a sensor suite.
    fn get_measurement_layout(&self, mode: SensorMode) -> Vec<StateVariable>;

    /// Returns the observation matrix `C` with `z = C * x`.
    fn measurement_matrix(&self, mode: SensorMode) -> DMatrix<f64>;

    /// Predicts the ideal measurement `z_pred = h(x)`.
    ///
    /// `u` and `dt` are not used by the linear models in this crate; they are
    /// part of the signature so estimators can call process and measurement
    /// models the same way.
    fn predict_measurement(
        &self,
        x: &State,
        u: &Control,
        dt: f64,
        mode: SensorMode,
    ) -> Result<Observation>;

    /// Like `predict_measurement`, but takes the sensor mode as its raw integer
    /// code and fails with `InvalidSensorMode` if it is not one of 1..=4.
    fn predict_measurement_raw(
        &self,
        x: &State,
        u: &Control,
        dt: f64,
        raw_mode: u8,
    ) -> Result<Observation> {
        let mode = SensorMode::try_from(raw_mode)?;
        self.predict_measurement(x, u, dt, mode)
    }

    /// Calculates the measurement Jacobian `H = ∂h/∂x`.
    fn calculate_jacobian(&self, x: &State, mode: SensorMode) -> Result<DMatrix<f64>>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn MeasurementModel>`.
dyn_clone::clone_trait_object!(MeasurementModel);

pub mod bicycle;
