// bicycle_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::models::dynamics::ProcessModel;
pub use crate::models::measurement::MeasurementModel;

// --- Core Data Structures ---
pub use crate::config::ModelConfig;
pub use crate::error::ModelError;
pub use crate::layout::{StateLayout, StateVariable};
pub use crate::sensors::SensorMode;
pub use crate::types::{Control, ControlInput, Observation, State, VehicleGeometry};

// --- Concrete Model Implementations ---
pub use crate::models::dynamics::bicycle::KinematicBicycle;
pub use crate::models::measurement::bicycle::BicycleMeasurement;
