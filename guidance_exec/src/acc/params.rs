//! Adaptive cruise control parameters

use serde::Deserialize;

/// Parameters for adaptive cruise control
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// If false maneuvers are given a pass-through strategy which never overrides a command
    pub enabled: bool,

    /// Time gap to hold behind the front vehicle.
    ///
    /// Units: seconds
    pub desired_time_gap_s: f64,

    /// Distance which is always kept free in front of the vehicle.
    ///
    /// Units: meters
    pub min_standoff_m: f64,

    /// Following stops once the time gap exceeds the desired gap times this factor.
    pub exit_distance_factor: f64,

    /// Deceleration assumed when checking if the vehicle can still slow in time.
    ///
    /// Units: meters/second^2
    pub max_decel_mss: f64,

    /// Proportional gain of the time gap controller
    pub k_p: f64,

    /// Integral gain of the time gap controller
    pub k_i: f64,

    /// Derivative gain of the time gap controller
    pub k_d: f64,

    /// Half width of the deadband about the desired time gap.
    ///
    /// Units: seconds
    pub deadband_s: f64,

    /// Number of samples in the output moving average
    pub num_averaging_samples: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
            desired_time_gap_s: 1.0,
            min_standoff_m: 5.0,
            exit_distance_factor: 1.5,
            max_decel_mss: 2.5,
            k_p: 1.0,
            k_i: 0.0,
            k_d: 0.0,
            deadband_s: 0.0,
            num_averaging_samples: 1,
        }
    }
}
