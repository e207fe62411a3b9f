// bicycle_core/src/models/measurement/bicycle.rs

use nalgebra::DMatrix;

use crate::error::{check_dim, Result};
use crate::layout::{StateLayout, StateVariable};
use crate::models::measurement::MeasurementModel;
use crate::sensors::SensorMode;
use crate::types::{Control, Observation, State};

/// Linear sensor model over a bicycle-model state.
///
/// Every sensor suite observes a subset of `[x, y, heading, speed]`. With a
/// heading drift term in the state, the IMU reports `heading + heading_drift`.
/// The predictive layout always observes `[x_pred, y_pred, heading_pred]`,
/// whatever the sensor suite.
#[derive(Debug, Clone)]
pub struct BicycleMeasurement {
    layout: StateLayout,
}

impl BicycleMeasurement {
    pub fn new(layout: StateLayout) -> Self {
        log::debug!("Building {} bicycle measurement model", layout);
        Self { layout }
    }

    pub fn layout(&self) -> StateLayout {
        self.layout
    }
}

/// Base state variables seen by a sensor suite, in measurement order.
fn observed_variables(mode: SensorMode) -> Vec<StateVariable> {
    let mut observed = Vec::with_capacity(4);
    if mode.has_gps() {
        observed.extend([StateVariable::Px, StateVariable::Py]);
    }
    if mode.has_imu() {
        observed.push(StateVariable::Heading);
    }
    if mode.has_encoder() {
        observed.push(StateVariable::Speed);
    }
    observed
}

impl MeasurementModel for BicycleMeasurement {
    fn get_measurement_layout(&self, mode: SensorMode) -> Vec<StateVariable> {
        match self.layout {
            StateLayout::Predictive => vec![
                StateVariable::PredPx,
                StateVariable::PredPy,
                StateVariable::PredHeading,
            ],
            StateLayout::Standard | StateLayout::HeadingDrift => observed_variables(mode),
        }
    }

    fn measurement_matrix(&self, mode: SensorMode) -> DMatrix<f64> {
        let observed = self.get_measurement_layout(mode);
        let mut c = DMatrix::zeros(observed.len(), self.layout.dim());

        for (row, var) in observed.iter().enumerate() {
            if let Some(col) = self.layout.find_idx(*var) {
                c[(row, col)] = 1.0;
            }
            // The IMU heading carries the drift bias.
            if *var == StateVariable::Heading {
                if let Some(drift_col) = self.layout.heading_drift_idx() {
                    c[(row, drift_col)] = 1.0;
                }
            }
        }
        c
    }

    fn predict_measurement(
        &self,
        x: &State,
        _u: &Control,
        _dt: f64,
        mode: SensorMode,
    ) -> Result<Observation> {
        check_dim("state vector", self.layout.dim(), x.nrows())?;
        Ok(self.measurement_matrix(mode) * x)
    }

    fn calculate_jacobian(&self, x: &State, mode: SensorMode) -> Result<DMatrix<f64>> {
        // h is linear, so H = C everywhere.
        check_dim("state vector", self.layout.dim(), x.nrows())?;
        Ok(self.measurement_matrix(mode))
    }
}
