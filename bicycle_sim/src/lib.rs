// bicycle_sim/src/lib.rs

//! Open-loop driver for the `bicycle_core` models.
//!
//! Loads a scenario, rolls the process model forward over a control schedule,
//! and produces noisy measurements of the resulting trajectory.

pub mod cli;
pub mod config;
pub mod error;
pub mod noise;
pub mod prng;
pub mod rollout;
