//! # Vehicle state messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position of the vehicle along the route.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteState {
    /// Distance travelled along the route from its start.
    ///
    /// Units: meters
    pub downtrack_m: f64,

    /// Index of the lane the vehicle currently occupies.
    pub lane_index: i32,
}

/// Longitudinal velocity of the vehicle in its body frame.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Units: meters/second
    pub linear_x_ms: f64,
}

/// Global 2D pose of the vehicle centre of gravity.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VehiclePose {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Orientation of the longitudinal axis, angle to the +ve x axis.
    ///
    /// Units: radians
    pub heading_rad: f64,
}
