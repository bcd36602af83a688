//! # Guidance Executable Parameters
//!
//! This module provide parameters for the guidance executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuidanceExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// If true every generated trajectory is saved into the session directory
    pub save_trajectories: bool,

    /// If true the executable stops once the message script has been fully replayed
    pub exit_at_end_of_script: bool,
}

impl Default for GuidanceExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.10,
            save_trajectories: true,
            exit_at_end_of_script: true,
        }
    }
}
