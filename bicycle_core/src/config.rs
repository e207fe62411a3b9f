// bicycle_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::layout::StateLayout;
use crate::models::dynamics::{bicycle::KinematicBicycle, ProcessModel};
use crate::models::measurement::{bicycle::BicycleMeasurement, MeasurementModel};
use crate::sensors::SensorMode;
use crate::types::VehicleGeometry;

/// Everything needed to build a matching pair of process and measurement models.
///
/// Maps to a `[model]` table such as:
///
/// ```toml
/// layout = "heading_drift"
/// sensor_mode = 2
/// [geometry]
/// cg_to_front = 1.105
/// cg_to_rear = 1.738
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default)]
    pub layout: StateLayout,
    pub geometry: VehicleGeometry,
    /// Raw value 1..=4, see `SensorMode`.
    pub sensor_mode: SensorMode,
    /// Horizon of the look-ahead block. Only used by the predictive layout.
    #[serde(default)]
    pub look_ahead_dt: f64,
}

impl ModelConfig {
    pub fn new(layout: StateLayout, geometry: VehicleGeometry, sensor_mode: SensorMode) -> Self {
        Self {
            layout,
            geometry,
            sensor_mode,
            look_ahead_dt: 0.0,
        }
    }

    /// Rejects a non-zero look-ahead on layouts that have no look-ahead block.
    pub fn validate(&self) -> Result<()> {
        if self.look_ahead_dt != 0.0 && self.layout.look_ahead_offset().is_none() {
            log::warn!(
                "look_ahead_dt = {} set on the {} layout",
                self.look_ahead_dt,
                self.layout
            );
            return Err(ModelError::UnusedLookAhead {
                layout: self.layout,
                look_ahead_dt: self.look_ahead_dt,
            });
        }
        Ok(())
    }

    pub fn build_process_model(&self) -> Result<Box<dyn ProcessModel>> {
        self.validate()?;
        let model =
            KinematicBicycle::new(self.geometry, self.layout).with_look_ahead(self.look_ahead_dt)?;
        Ok(Box::new(model))
    }

    pub fn build_measurement_model(&self) -> Box<dyn MeasurementModel> {
        Box::new(BicycleMeasurement::new(self.layout))
    }
}
