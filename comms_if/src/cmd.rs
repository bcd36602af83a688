//! # Guidance output commands
//!
//! These are the items published by the guidance core every cycle, the speed command for the
//! longitudinal controller and the trajectory for the low level vehicle controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Speed command for the vehicle controller.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpeedAccelCmd {
    /// Commanded speed.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Maximum magnitude of acceleration the controller may use to reach the commanded speed.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,
}

/// A single point of a generated trajectory.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrajPoint {
    /// Position in the map frame.
    ///
    /// Units: meters
    pub x_m: f64,
    pub y_m: f64,

    /// Distance along the fitted curve from the first point of the trajectory.
    ///
    /// Units: meters
    pub offset_m: f64,

    /// Target speed at this point.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Heading of the path at this point, angle to the +ve x axis.
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Curvature of the path at this point.
    ///
    /// Units: 1/meters
    pub curv_m: f64,
}

/// A complete trajectory to be followed by the vehicle controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    /// Downtrack distance of the vehicle when the trajectory was generated.
    pub generated_at_dist_m: f64,

    pub points: Vec<TrajPoint>,
}
