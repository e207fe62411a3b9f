// bicycle_sim/src/config.rs

//! Scenario files: what vehicle to simulate, how to drive it, and how noisy
//! its sensors are.

use bicycle_core::prelude::*;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;

use crate::error::SimError;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: SimulationSettings,

    pub model: ModelConfig,

    pub initial_state: InitialState,

    #[serde(default)]
    pub noise: NoiseConfig,

    // The TOML has `[[controls]]`, which becomes a Vec of ControlSegment structs.
    #[serde(default)]
    pub controls: Vec<ControlSegment>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Step length in seconds.
    pub dt: f64,
    /// Duration of the simulation in seconds.
    pub duration_seconds: f64,
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            dt: 0.1,
            duration_seconds: 10.0,
            seed: None,
        }
    }
}

/// Upper bound on the number of steps in a single run.
pub const MAX_STEPS: usize = 10_000_000;

impl SimulationSettings {
    /// Number of `dt` steps needed to cover the duration, or `None` if that
    /// is not finite or exceeds `MAX_STEPS`.
    pub fn checked_num_steps(&self) -> Option<usize> {
        // Absorbs the rounding error of ratios like 0.3 / 0.1.
        let steps = (self.duration_seconds / self.dt - 1e-9).ceil().max(0.0);
        if steps.is_finite() && steps <= MAX_STEPS as f64 {
            Some(steps as usize)
        } else {
            None
        }
    }

    /// Number of `dt` steps needed to cover the duration, clamped to `MAX_STEPS`.
    /// `ScenarioConfig::validate` rejects scenarios that would hit the clamp.
    pub fn num_steps(&self) -> usize {
        self.checked_num_steps().unwrap_or(MAX_STEPS)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct InitialState {
    /// Laid out as the model's state layout describes.
    pub values: Vec<f64>,
}

/// Standard deviations of the additive Gaussian sensor noise.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    #[serde(default)]
    pub position_stddev: f64,
    #[serde(default)]
    pub heading_stddev: f64,
    #[serde(default)]
    pub speed_stddev: f64,
}

/// A control input held from `start_time` until the next segment starts.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ControlSegment {
    pub start_time: f64,
    #[serde(default)]
    pub steering_angle: f64,
    #[serde(default)]
    pub acceleration: f64,
}

impl ScenarioConfig {
    /// Checks everything serde cannot: step sizes, state length and schedule order.
    pub fn validate(&self) -> Result<(), SimError> {
        let sim = &self.simulation;
        if !(sim.dt.is_finite() && sim.dt > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "dt must be positive, got {}",
                sim.dt
            )));
        }
        if !(sim.duration_seconds.is_finite() && sim.duration_seconds >= 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "duration_seconds must be non-negative, got {}",
                sim.duration_seconds
            )));
        }

        if sim.checked_num_steps().is_none() {
            return Err(SimError::InvalidScenario(format!(
                "duration_seconds = {} with dt = {} needs more than {} steps",
                sim.duration_seconds, sim.dt, MAX_STEPS
            )));
        }

        self.model.validate()?;

        let expected = self.model.layout.dim();
        if self.initial_state.values.len() != expected {
            return Err(SimError::InvalidScenario(format!(
                "initial_state has {} values, the {} layout needs {}",
                self.initial_state.values.len(),
                self.model.layout,
                expected
            )));
        }

        if self
            .controls
            .windows(2)
            .any(|pair| pair[1].start_time < pair[0].start_time)
        {
            return Err(SimError::InvalidScenario(
                "controls must be sorted by start_time".to_string(),
            ));
        }
        Ok(())
    }

    /// The control input active at time `t`. Before the first segment the vehicle coasts.
    pub fn control_at(&self, t: f64) -> ControlInput {
        self.controls
            .iter()
            .take_while(|segment| segment.start_time <= t)
            .last()
            .map(|segment| ControlInput::new(segment.steering_angle, segment.acceleration))
            .unwrap_or_default()
    }
}

/// Loads and validates a scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    if !path.exists() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    log::info!("Loading scenario from: {:?}", path);
    scenario_from_figment(Figment::new().merge(Toml::file(path)))
}

/// Parses and validates a scenario held in memory.
pub fn scenario_from_str(toml: &str) -> Result<ScenarioConfig, SimError> {
    scenario_from_figment(Figment::new().merge(Toml::string(toml)))
}

fn scenario_from_figment(figment: Figment) -> Result<ScenarioConfig, SimError> {
    let scenario: ScenarioConfig = figment.extract()?;
    scenario.validate()?;
    log::info!(
        "Scenario ready: {} layout, {} sensors, {} steps of {} s",
        scenario.model.layout,
        scenario.model.sensor_mode,
        scenario.simulation.num_steps(),
        scenario.simulation.dt
    );
    Ok(scenario)
}
