// bicycle_sim/src/error.rs

use bicycle_core::error::ModelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file not found: {0:?}")]
    ScenarioNotFound(PathBuf),

    #[error("failed to load or parse scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid sensor noise: {0}")]
    Noise(#[from] rand_distr::NormalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
