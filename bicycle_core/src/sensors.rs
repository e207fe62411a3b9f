// bicycle_core/src/sensors.rs

//! Sensor suites that can feed the estimator. The active suite decides which
//! state components show up in a measurement.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SensorMode {
    /// GPS, IMU and wheel encoders: position, heading and speed.
    GpsImuEncoder = 1,
    /// IMU and wheel encoders: heading and speed.
    ImuEncoder = 2,
    /// GPS only: position.
    Gps = 3,
    /// GPS and wheel encoders: position and speed.
    GpsEncoder = 4,
}

impl SensorMode {
    pub const ALL: [SensorMode; 4] = [
        SensorMode::GpsImuEncoder,
        SensorMode::ImuEncoder,
        SensorMode::Gps,
        SensorMode::GpsEncoder,
    ];

    pub fn has_gps(&self) -> bool {
        matches!(
            self,
            SensorMode::GpsImuEncoder | SensorMode::Gps | SensorMode::GpsEncoder
        )
    }

    pub fn has_imu(&self) -> bool {
        matches!(self, SensorMode::GpsImuEncoder | SensorMode::ImuEncoder)
    }

    pub fn has_encoder(&self) -> bool {
        matches!(
            self,
            SensorMode::GpsImuEncoder | SensorMode::ImuEncoder | SensorMode::GpsEncoder
        )
    }
}

impl TryFrom<u8> for SensorMode {
    type Error = ModelError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(SensorMode::GpsImuEncoder),
            2 => Ok(SensorMode::ImuEncoder),
            3 => Ok(SensorMode::Gps),
            4 => Ok(SensorMode::GpsEncoder),
            other => {
                log::error!("Rejecting unknown sensor mode {}", other);
                Err(ModelError::InvalidSensorMode(other))
            }
        }
    }
}

impl From<SensorMode> for u8 {
    fn from(mode: SensorMode) -> Self {
        mode as u8
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorMode::GpsImuEncoder => "GPS+IMU+Encoder",
            SensorMode::ImuEncoder => "IMU+Encoder",
            SensorMode::Gps => "GPS",
            SensorMode::GpsEncoder => "GPS+Encoder",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip() {
        for mode in SensorMode::ALL {
            assert_eq!(SensorMode::try_from(u8::from(mode)), Ok(mode));
        }
    }

    #[test]
    fn unknown_raw_values_are_rejected() {
        for raw in [0u8, 5, 255] {
            assert_eq!(
                SensorMode::try_from(raw),
                Err(ModelError::InvalidSensorMode(raw))
            );
        }
    }

    #[test]
    fn sensor_suites() {
        assert!(SensorMode::GpsImuEncoder.has_gps());
        assert!(SensorMode::GpsImuEncoder.has_imu());
        assert!(!SensorMode::ImuEncoder.has_gps());
        assert!(!SensorMode::Gps.has_encoder());
        assert!(SensorMode::GpsEncoder.has_encoder());
        assert!(!SensorMode::GpsEncoder.has_imu());
    }
}
