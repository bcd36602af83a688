//! # Communications interface crate.
//!
//! Provides the message definitions exchanged between the guidance core and the rest of the
//! vehicle software. The transport itself is not defined here, only the data which crosses it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Incoming messages (vehicle state, roadway environment, maneuver plans)
pub mod msg;

/// Maneuver definitions as planned by the upstream arbitrator
pub mod mnvr;

/// Outgoing commands and trajectories
pub mod cmd;
