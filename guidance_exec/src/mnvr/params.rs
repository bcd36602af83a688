//! Maneuver parameters

use serde::Deserialize;

/// Parameters shared by all longitudinal maneuvers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Maximum acceleration (or deceleration) a maneuver may plan with.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Speed changes smaller than this are planned at half the maximum acceleration.
    ///
    /// Units: meters/second
    pub small_speed_change_ms: f64,

    /// Minimum time a steady speed maneuver covers when planned without a target distance.
    ///
    /// Units: seconds
    pub steady_min_duration_s: f64,

    /// Largest difference between start and end speed for a maneuver to be considered steady.
    ///
    /// Units: meters/second
    pub steady_speed_tolerance_ms: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_accel_mss: 2.5,
            small_speed_change_ms: 2.0,
            steady_min_duration_s: 5.0,
            steady_speed_tolerance_ms: 0.1,
        }
    }
}
