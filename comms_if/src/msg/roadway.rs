//! # Roadway environment messages
//!
//! The roadway environment is the list of obstacles currently tracked by perception, each
//! annotated with its route-relative position and lane membership.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// All obstacles on the roadway at a given instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoadwayEnvironment {
    pub obstacles: Vec<RoadwayObstacle>,
}

/// An obstacle located on the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoadwayObstacle {
    /// Downtrack distance of the obstacle's centre along the route.
    ///
    /// Units: meters
    pub downtrack_m: f64,

    /// Lane the obstacle mostly occupies.
    pub primary_lane: i32,

    /// Other lanes the obstacle overlaps.
    #[serde(default)]
    pub secondary_lanes: Vec<i32>,

    /// Perceived object data.
    pub object: ExternalObject,
}

/// A perceived object, relative to the host vehicle.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalObject {
    /// Position of the object in the host vehicle frame.
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Half extents of the object's bounding box along the x, y and z axes.
    ///
    /// Units: meters
    pub size_m: [f64; 3],

    /// Velocity of the object relative to the host vehicle.
    ///
    /// Units: meters/second
    pub velocity_ms: [f64; 3],
}
