// bicycle_sim/src/rollout.rs

//! Open-loop propagation of the ground-truth state and the matching noisy
//! sensor readings.

use bicycle_core::prelude::*;
use rand::Rng;
use std::io::Write;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::noise::SensorNoise;

/// One sample of the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutRecord {
    pub time: f64,
    /// Ground-truth state.
    pub state: State,
    /// Noisy measurement of `state` from the active sensor suite.
    pub measurement: Observation,
}

/// Everything produced by a run, with the names of each column.
#[derive(Debug, Clone)]
pub struct Trace {
    pub state_variables: Vec<StateVariable>,
    pub measurement_variables: Vec<StateVariable>,
    pub records: Vec<RolloutRecord>,
}

impl Trace {
    /// Writes the trace as CSV: `time`, the state columns, then the
    /// measurement columns prefixed with `meas_`.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let mut header = vec!["time".to_string()];
        header.extend(self.state_variables.iter().map(|v| v.name().to_string()));
        header.extend(
            self.measurement_variables
                .iter()
                .map(|v| format!("meas_{}", v.name())),
        );
        writeln!(writer, "{}", header.join(","))?;

        for record in &self.records {
            let row: Vec<String> = std::iter::once(record.time)
                .chain(record.state.iter().copied())
                .chain(record.measurement.iter().copied())
                .map(|value| value.to_string())
                .collect();
            writeln!(writer, "{}", row.join(","))?;
        }
        writer.flush()
    }
}

/// Drives a process model through a scenario's control schedule.
#[derive(Debug, Clone)]
pub struct Rollout {
    scenario: ScenarioConfig,
    process: Box<dyn ProcessModel>,
    measurement: Box<dyn MeasurementModel>,
    noise: SensorNoise,
}

impl Rollout {
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, SimError> {
        scenario.validate()?;
        let process = scenario.model.build_process_model()?;
        let measurement = scenario.model.build_measurement_model();
        let noise = SensorNoise::new(
            &scenario.noise,
            &measurement.get_measurement_layout(scenario.model.sensor_mode),
        )?;
        Ok(Self {
            scenario: scenario.clone(),
            process,
            measurement,
            noise,
        })
    }

    /// Runs the scenario. The trace holds the initial state plus one record per step.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Trace, SimError> {
        let dt = self.scenario.simulation.dt;
        let mode = self.scenario.model.sensor_mode;
        let num_steps = self.scenario.simulation.num_steps();

        let mut records = Vec::with_capacity(num_steps + 1);
        let mut state = State::from_column_slice(&self.scenario.initial_state.values);
        let mut time = 0.0;

        for step in 0..=num_steps {
            let u = self.scenario.control_at(time).to_vector();
            let z = self.measurement.predict_measurement(&state, &u, dt, mode)?;
            records.push(RolloutRecord {
                time,
                state: state.clone(),
                measurement: self.noise.corrupt(&z, rng),
            });

            if step == num_steps {
                break;
            }
            state = self.process.propagate(&state, &u, dt)?;
            time = (step + 1) as f64 * dt;
        }

        log::info!(
            "Rollout finished: {} records, final state {:?}",
            records.len(),
            state.as_slice()
        );
        log::debug!("Measurement covariance R = {}", self.noise.covariance());

        Ok(Trace {
            state_variables: self.process.get_state_variables(),
            measurement_variables: self.measurement.get_measurement_layout(mode),
            records,
        })
    }
}
