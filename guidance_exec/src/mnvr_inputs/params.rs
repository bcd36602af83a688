//! Maneuver inputs parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the maneuver inputs aggregator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Overall length of the host vehicle.
    ///
    /// Units: meters
    pub vehicle_length_m: f64,

    /// Time between a speed command being issued and the vehicle beginning to respond to it.
    ///
    /// Units: seconds
    pub vehicle_response_lag_s: f64,

    /// If true an obstacle is also considered in-lane when any of its secondary lanes is the
    /// host vehicle's lane.
    pub check_secondary_lanes: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vehicle_length_m: 3.0,
            vehicle_response_lag_s: 1.4,
            check_secondary_lanes: false,
        }
    }
}
