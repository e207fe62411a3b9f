// bicycle_core/src/lib.rs

//! Discrete-time kinematic bicycle models for ground vehicle state estimation.
//!
//! The crate only provides the model functions an estimator calls each cycle:
//! process models `x[k+1] = f(x[k], u[k], dt)` and measurement models
//! `z = h(x)`, together with their Jacobians. It performs no I/O.

pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod prelude;
pub mod sensors;
pub mod types;
