//! # Adaptive Cruise Control
//!
//! An ACC strategy sits between a maneuver and the commanded speed. Each cycle the maneuver
//! passes the speed it would like to command and the strategy returns the speed which may
//! actually be commanded given the vehicle ahead. A strategy never raises the speed it is given.
//!
//! Strategies are built by an [`AccStrategyFactory`], each maneuver owning its own strategy and
//! so its own filter history.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod basic;
mod factory;
mod params;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use basic::BasicAccStrategy;
pub use factory::AccStrategyFactory;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;

use crate::mnvr_inputs::InputsSnapshot;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speeds below this are treated as stationary, in which case the time gap is always satisfied.
///
/// Units: meters/second
pub const SPEED_EPSILON_MS: f64 = 0.01;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A strategy deciding if and how a commanded speed is overridden to follow a front vehicle.
pub trait AccStrategy: Debug + Send {
    /// Compute the speed to command in place of `cmd_speed_ms`.
    ///
    /// The returned speed is always within `[0, cmd_speed_ms]`.
    fn acc_override(&mut self, cmd_speed_ms: f64, inputs: &InputsSnapshot, time_s: f64) -> f64;

    /// True while the strategy is actively following a front vehicle.
    fn is_engaged(&self) -> bool;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Strategy which never overrides the command, used when ACC is disabled.
#[derive(Debug, Default, Clone)]
pub struct NoOpAccStrategy;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AccStrategy for NoOpAccStrategy {
    fn acc_override(&mut self, cmd_speed_ms: f64, _inputs: &InputsSnapshot, _time_s: f64) -> f64 {
        cmd_speed_ms
    }

    fn is_engaged(&self) -> bool {
        false
    }
}
