// bicycle_core/src/models/dynamics/mod.rs

use crate::error::Result;
use crate::layout::{StateLayout, StateVariable};
use crate::types::{Control, State};
use dyn_clone::DynClone;
use nalgebra::DMatrix;
use std::fmt::Debug;

// --- PROCESS MODEL TRAIT ---
// Discrete-time transition of the vehicle state. `x[k+1] = f(x[k], u[k], dt)`
/// A discrete-time process model, as called by a state estimator on every cycle.
///
/// Implementations only hold immutable parameters (geometry, layout), so a
/// single instance can be shared freely between threads.
pub trait ProcessModel: DynClone + Debug + Send + Sync {
    /// Returns the layout of the state vector this model propagates.
    fn get_state_layout(&self) -> StateLayout;

    /// Returns the ordered state variables. The order defines the indices of `x`.
    fn get_state_variables(&self) -> Vec<StateVariable> {
        self.get_state_layout().variables()
    }

    /// Returns the total number of states (the length of the state vector `x`).
    fn get_state_dim(&self) -> usize {
        self.get_state_layout().dim()
    }

    /// Returns the number of dimensions in the control input vector `u`.
    fn get_control_dim(&self) -> usize;

    /// Advances the state by one step of length `dt`.
    ///
    /// # Arguments
    /// * `x`: Current state vector, laid out as `get_state_layout()` describes.
    /// * `u`: Control input `[steering_angle, acceleration]`, held constant over `dt`.
    /// * `dt`: Step duration in seconds. Must be finite and non-negative.
    ///
    /// # Returns
    /// The state at the end of the step, or an error if `x`, `u` or `dt` are malformed.
    fn propagate(&self, x: &State, u: &Control, dt: f64) -> Result<State>;

    /// Calculates the Jacobians of `propagate` at `(x, u)`.
    ///
    /// # Returns
    /// A tuple `(F, B)` where `F = ∂f/∂x` is NxN and `B = ∂f/∂u` is NxM
    /// (N = state dim, M = control dim).
    fn calculate_jacobian(
        &self,
        x: &State,
        u: &Control,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>)>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn ProcessModel>`.
dyn_clone::clone_trait_object!(ProcessModel);

pub mod bicycle;
