// bicycle_core/src/layout.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every quantity that can appear in a bicycle-model state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Current pose and speed ---
    Px,
    Py,
    Heading,
    Speed,
    // --- Slowly varying bias on the heading sensor ---
    HeadingDrift,
    // --- Look-ahead copies ---
    PredPx,
    PredPy,
    PredHeading,
    PredSpeed,
}

impl StateVariable {
    /// Short, stable name used for column headers and logs.
    pub fn name(&self) -> &'static str {
        match self {
            StateVariable::Px => "x",
            StateVariable::Py => "y",
            StateVariable::Heading => "heading",
            StateVariable::Speed => "speed",
            StateVariable::HeadingDrift => "heading_drift",
            StateVariable::PredPx => "x_pred",
            StateVariable::PredPy => "y_pred",
            StateVariable::PredHeading => "heading_pred",
            StateVariable::PredSpeed => "speed_pred",
        }
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of `x` in every layout.
pub const IDX_PX: usize = 0;
/// Index of `y` in every layout.
pub const IDX_PY: usize = 1;
/// Index of the heading in every layout.
pub const IDX_HEADING: usize = 2;
/// Index of the speed in every layout.
pub const IDX_SPEED: usize = 3;
/// Number of leading entries shared by all layouts: `[x, y, heading, speed]`.
pub const BASE_DIM: usize = 4;

/// Describes how a state vector is laid out.
///
/// All layouts start with the same four base entries `[x, y, heading, speed]`;
/// they differ only in what is appended after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateLayout {
    /// `[x, y, heading, speed]`
    #[default]
    Standard,
    /// `[x, y, heading, speed, heading_drift]`
    HeadingDrift,
    /// `[x, y, heading, speed, x_pred, y_pred, heading_pred, speed_pred]`
    Predictive,
}

impl StateLayout {
    /// Returns the ordered list of state variables. The order defines the indices of `x`.
    pub fn variables(&self) -> Vec<StateVariable> {
        let mut layout = vec![
            StateVariable::Px,
            StateVariable::Py,
            StateVariable::Heading,
            StateVariable::Speed,
        ];
        match self {
            StateLayout::Standard => {}
            StateLayout::HeadingDrift => layout.push(StateVariable::HeadingDrift),
            StateLayout::Predictive => layout.extend([
                StateVariable::PredPx,
                StateVariable::PredPy,
                StateVariable::PredHeading,
                StateVariable::PredSpeed,
            ]),
        }
        layout
    }

    pub fn dim(&self) -> usize {
        match self {
            StateLayout::Standard => BASE_DIM,
            StateLayout::HeadingDrift => BASE_DIM + 1,
            StateLayout::Predictive => 2 * BASE_DIM,
        }
    }

    /// Finds the index of a variable in this layout.
    pub fn find_idx(&self, var: StateVariable) -> Option<usize> {
        self.variables().iter().position(|v| *v == var)
    }

    /// Index of the heading drift term, if the layout carries one.
    pub fn heading_drift_idx(&self) -> Option<usize> {
        match self {
            StateLayout::HeadingDrift => Some(BASE_DIM),
            _ => None,
        }
    }

    /// Start of the look-ahead block, if the layout carries one.
    pub fn look_ahead_offset(&self) -> Option<usize> {
        match self {
            StateLayout::Predictive => Some(BASE_DIM),
            _ => None,
        }
    }
}

impl fmt::Display for StateLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateLayout::Standard => "standard",
            StateLayout::HeadingDrift => "heading_drift",
            StateLayout::Predictive => "predictive",
        };
        f.write_str(name)
    }
}
