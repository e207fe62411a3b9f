// bicycle_sim/src/noise.rs

use bicycle_core::prelude::*;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::NoiseConfig;
use crate::error::SimError;

/// Additive, zero-mean Gaussian noise for one measurement layout.
#[derive(Debug, Clone)]
pub struct SensorNoise {
    // One entry per measurement component, in measurement order.
    stddevs: Vec<f64>,
    distributions: Vec<Normal<f64>>,
}

impl SensorNoise {
    pub fn new(
        config: &NoiseConfig,
        measurement_layout: &[StateVariable],
    ) -> Result<Self, SimError> {
        let stddevs: Vec<f64> = measurement_layout
            .iter()
            .map(|var| stddev_for(config, *var))
            .collect();
        let distributions = stddevs
            .iter()
            .map(|stddev| Normal::new(0.0, *stddev))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            stddevs,
            distributions,
        })
    }

    /// The measurement noise covariance `R` matching this noise.
    pub fn covariance(&self) -> DMatrix<f64> {
        let variances = DVector::from_iterator(
            self.stddevs.len(),
            self.stddevs.iter().map(|stddev| stddev.powi(2)),
        );
        DMatrix::from_diagonal(&variances)
    }

    pub fn corrupt<R: Rng + ?Sized>(&self, z: &Observation, rng: &mut R) -> Observation {
        let mut noisy = z.clone();
        for (value, dist) in noisy.iter_mut().zip(&self.distributions) {
            *value += dist.sample(rng);
        }
        noisy
    }
}

fn stddev_for(config: &NoiseConfig, var: StateVariable) -> f64 {
    match var {
        StateVariable::Px | StateVariable::Py | StateVariable::PredPx | StateVariable::PredPy => {
            config.position_stddev
        }
        StateVariable::Heading | StateVariable::PredHeading | StateVariable::HeadingDrift => {
            config.heading_stddev
        }
        StateVariable::Speed | StateVariable::PredSpeed => config.speed_stddev,
    }
}
