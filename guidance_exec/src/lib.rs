//! # Guidance library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the guidance crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Adaptive cruise control - limits commanded speeds to keep a safe gap to the vehicle ahead
pub mod acc;

/// Control cycle - runs the guidance modules once per cycle
pub mod control_cycle;

/// Global data store for the executable
pub mod data_store;

/// Maneuvers - plan and execute longitudinal speed changes
pub mod mnvr;

/// Maneuver executive - steps the queue of planned maneuvers
pub mod mnvr_exec;

/// Maneuver inputs - the latest vehicle state and front vehicle
pub mod mnvr_inputs;

/// Message processor - routes incoming messages to the modules
pub mod msg_processor;

/// Executable parameters
pub mod params;

/// Signal processing - filters used by adaptive cruise control
pub mod signals;

/// Trajectory generation - converts maneuvers and road geometry into a trajectory
pub mod traj_gen;
