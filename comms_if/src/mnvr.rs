//! # Maneuver messages
//!
//! Maneuvers are produced by the upstream arbitrator as an ordered plan. Only lane following is
//! consumed by trajectory generation, the other kinds are carried so a plan can be received whole
//! and rejected explicitly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An ordered sequence of maneuvers to be executed one after the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MnvrPlan {
    pub mnvrs: Vec<Mnvr>,
}

/// Follow the current lane between two downtrack distances.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaneFollowingMnvr {
    /// Downtrack distance at which the maneuver begins.
    ///
    /// Units: meters
    pub start_dist_m: f64,

    /// Downtrack distance at which the maneuver ends.
    ///
    /// Units: meters
    pub end_dist_m: f64,

    /// Speed at the start of the maneuver.
    ///
    /// Units: meters/second
    pub start_speed_ms: f64,

    /// Target speed at the end of the maneuver.
    ///
    /// Units: meters/second
    pub end_speed_ms: f64,
}

/// Move from one lane into a neighbouring one.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaneChangeMnvr {
    pub start_dist_m: f64,
    pub end_dist_m: f64,
    pub start_speed_ms: f64,
    pub end_speed_ms: f64,
    pub starting_lane: i32,
    pub ending_lane: i32,
}

/// Bring the vehicle to a halt by the end distance.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopMnvr {
    pub start_dist_m: f64,
    pub end_dist_m: f64,
    pub start_speed_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single planned maneuver.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mnvr {
    LaneFollowing(LaneFollowingMnvr),
    LaneChange(LaneChangeMnvr),
    Stop(StopMnvr),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mnvr {
    /// Short name of the maneuver kind, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Mnvr::LaneFollowing(_) => "LaneFollowing",
            Mnvr::LaneChange(_) => "LaneChange",
            Mnvr::Stop(_) => "Stop",
        }
    }

    pub fn start_dist_m(&self) -> f64 {
        match self {
            Mnvr::LaneFollowing(m) => m.start_dist_m,
            Mnvr::LaneChange(m) => m.start_dist_m,
            Mnvr::Stop(m) => m.start_dist_m,
        }
    }

    pub fn end_dist_m(&self) -> f64 {
        match self {
            Mnvr::LaneFollowing(m) => m.end_dist_m,
            Mnvr::LaneChange(m) => m.end_dist_m,
            Mnvr::Stop(m) => m.end_dist_m,
        }
    }
}
