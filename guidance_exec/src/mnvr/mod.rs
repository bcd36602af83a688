//! # Maneuvers
//!
//! A maneuver is a segment of longitudinal motion between two downtrack distances, moving from a
//! start speed to an end speed. It is first planned, which fixes its end distance, acceleration
//! and duration, then executed one control cycle at a time, each step emitting a speed and
//! acceleration command. Every command passes through the maneuver's own ACC strategy.
//!
//! ```text
//! Unplanned --plan--> Planned --first step--> Executing --last step--> Completed
//! ```
//!
//! Planning failures leave the maneuver untouched.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod slow_down;
mod speed_up;
mod steady_speed;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use slow_down::SlowDown;
pub use speed_up::SpeedUp;
pub use steady_speed::SteadySpeed;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;

use comms_if::cmd::SpeedAccelCmd;
use log::debug;
use thiserror::Error;

use crate::{acc::AccStrategy, mnvr_inputs::InputsSnapshot};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lifecycle of a maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnvrState {
    Unplanned,
    Planned,
    Executing,
    Completed,
}

/// Errors which can occur while planning or executing a maneuver.
#[derive(Debug, Error, PartialEq)]
pub enum MnvrError {
    #[error("End speed ({end_ms} m/s) must be greater than start speed ({start_ms} m/s)")]
    NonIncreasingSpeed { start_ms: f64, end_ms: f64 },

    #[error("End speed ({end_ms} m/s) must be less than start speed ({start_ms} m/s)")]
    NonDecreasingSpeed { start_ms: f64, end_ms: f64 },

    #[error("Start ({start_ms} m/s) and end ({end_ms} m/s) speeds differ by more than {tol_ms} m/s")]
    SpeedNotSteady {
        start_ms: f64,
        end_ms: f64,
        tol_ms: f64,
    },

    #[error("End distance ({end_m} m) must be greater than start distance ({start_m} m)")]
    NonIncreasingDistance { start_m: f64, end_m: f64 },

    #[error("Acceleration of {0} m/s^2 cannot be planned with")]
    InvalidAccel(f64),

    #[error("A maneuver held at {speed_ms} m/s can never cover {length_m} m")]
    StationaryOverDistance { speed_ms: f64, length_m: f64 },

    #[error("The maneuver must be planned before it can be executed")]
    NotPlanned,

    #[error("Time went backwards: step at {time_s} s is before the maneuver start at {start_s} s")]
    ClockRegression { start_s: f64, time_s: f64 },
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Sink for the commands emitted by an executing maneuver.
pub trait GuidanceCommands {
    fn set_command(&mut self, speed_ms: f64, max_accel_mss: f64);
}

/// A longitudinal maneuver.
pub trait Mnvr: Debug + Send {
    /// Short name of the maneuver kind, used in logs.
    fn name(&self) -> &'static str;

    /// Plan the maneuver to start at `start_dist_m`, choosing the end distance from the
    /// maneuver's own kinematics.
    fn plan(&mut self, inputs: &InputsSnapshot, start_dist_m: f64) -> Result<(), MnvrError>;

    /// Plan the maneuver to run from `start_dist_m` to `end_dist_m`.
    fn plan_to_target_distance(
        &mut self,
        inputs: &InputsSnapshot,
        start_dist_m: f64,
        end_dist_m: f64,
    ) -> Result<(), MnvrError>;

    /// Execute one control cycle at `time_s`, sending a command to `commands`.
    ///
    /// Returns `true` once the maneuver has completed. On error no command is sent.
    fn execute_time_step(
        &mut self,
        inputs: &InputsSnapshot,
        time_s: f64,
        commands: &mut dyn GuidanceCommands,
    ) -> Result<bool, MnvrError>;

    fn core(&self) -> &LongitudinalCore;

    fn state(&self) -> MnvrState {
        self.core().state
    }

    fn start_dist_m(&self) -> f64 {
        self.core().start_dist_m
    }

    fn end_dist_m(&self) -> f64 {
        self.core().end_dist_m
    }

    fn start_speed_ms(&self) -> f64 {
        self.core().start_speed_ms
    }

    fn end_speed_ms(&self) -> f64 {
        self.core().end_speed_ms
    }

    fn working_accel_mss(&self) -> f64 {
        self.core().working_accel_mss
    }

    fn delta_t_s(&self) -> f64 {
        self.core().delta_t_s
    }

    fn is_completed(&self) -> bool {
        self.core().state == MnvrState::Completed
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Data and behaviour common to all longitudinal maneuvers.
#[derive(Debug)]
pub struct LongitudinalCore {
    start_dist_m: f64,
    end_dist_m: f64,

    start_speed_ms: f64,
    end_speed_ms: f64,

    /// Acceleration the maneuver has been planned with
    working_accel_mss: f64,

    /// Planned duration of the maneuver
    delta_t_s: f64,

    max_accel_mss: f64,
    small_speed_change_ms: f64,

    /// Time of the first execution step
    start_time_s: Option<f64>,

    state: MnvrState,

    acc: Box<dyn AccStrategy>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidanceCommands for Option<SpeedAccelCmd> {
    fn set_command(&mut self, speed_ms: f64, max_accel_mss: f64) {
        *self = Some(SpeedAccelCmd {
            speed_ms,
            max_accel_mss,
        });
    }
}

impl GuidanceCommands for Vec<SpeedAccelCmd> {
    fn set_command(&mut self, speed_ms: f64, max_accel_mss: f64) {
        self.push(SpeedAccelCmd {
            speed_ms,
            max_accel_mss,
        });
    }
}

impl LongitudinalCore {
    pub fn new(
        start_speed_ms: f64,
        end_speed_ms: f64,
        params: &Params,
        acc: Box<dyn AccStrategy>,
    ) -> Self {
        Self {
            start_dist_m: 0.0,
            end_dist_m: 0.0,
            start_speed_ms,
            end_speed_ms,
            working_accel_mss: 0.0,
            delta_t_s: 0.0,
            max_accel_mss: params.max_accel_mss,
            small_speed_change_ms: params.small_speed_change_ms,
            start_time_s: None,
            state: MnvrState::Unplanned,
            acc,
        }
    }

    pub fn acc(&self) -> &dyn AccStrategy {
        self.acc.as_ref()
    }

    /// Acceleration to use for a speed change of `delta_v_ms`.
    ///
    /// Small changes are made at half the maximum acceleration.
    fn accel_for_speed_change(&self, delta_v_ms: f64) -> Result<f64, MnvrError> {
        if self.max_accel_mss <= 0.0 || !self.max_accel_mss.is_finite() {
            return Err(MnvrError::InvalidAccel(self.max_accel_mss));
        }

        if delta_v_ms < self.small_speed_change_ms {
            Ok(0.5 * self.max_accel_mss)
        } else {
            Ok(self.max_accel_mss)
        }
    }

    /// Store a plan, moving the maneuver into `Planned`.
    fn commit_plan(&mut self, start_dist_m: f64, end_dist_m: f64, accel_mss: f64, delta_t_s: f64) {
        self.start_dist_m = start_dist_m;
        self.end_dist_m = end_dist_m;
        self.working_accel_mss = accel_mss;
        self.delta_t_s = delta_t_s;
        self.start_time_s = None;
        self.state = MnvrState::Planned;
    }

    /// Latch the start time on the first step and check time has not regressed.
    ///
    /// Returns the start time.
    fn begin_step(&mut self, time_s: f64) -> Result<f64, MnvrError> {
        if self.state == MnvrState::Unplanned {
            return Err(MnvrError::NotPlanned);
        }

        let start_s = *self.start_time_s.get_or_insert(time_s);

        if time_s < start_s {
            return Err(MnvrError::ClockRegression { start_s, time_s });
        }

        if self.state == MnvrState::Planned {
            debug!(
                "Maneuver started at {:.2} s ({:.2} m -> {:.2} m, {:.2} m/s -> {:.2} m/s)",
                start_s, self.start_dist_m, self.end_dist_m, self.start_speed_ms, self.end_speed_ms
            );
            self.state = MnvrState::Executing;
        }

        Ok(start_s)
    }

    /// Execute one step interpolating speed linearly in time from start to end speed.
    fn interpolate_step(
        &mut self,
        inputs: &InputsSnapshot,
        time_s: f64,
        commands: &mut dyn GuidanceCommands,
    ) -> Result<bool, MnvrError> {
        let start_s = self.begin_step(time_s)?;

        let factor = (time_s - start_s) / self.delta_t_s;
        let completed = factor >= 1.0;
        let factor = factor.min(1.0);

        let speed_ms = lin_map(
            (0.0, 1.0),
            (self.start_speed_ms, self.end_speed_ms),
            factor,
        );
        let speed_ms = self.acc.acc_override(speed_ms, inputs, time_s);

        commands.set_command(speed_ms, self.working_accel_mss);

        if completed && self.state != MnvrState::Completed {
            debug!("Maneuver completed at {:.2} s", time_s);
            self.state = MnvrState::Completed;
        }

        Ok(completed)
    }

    /// Execute one step at constant speed, completing once the vehicle has reached the end
    /// distance.
    fn constant_speed_step(
        &mut self,
        inputs: &InputsSnapshot,
        time_s: f64,
        commands: &mut dyn GuidanceCommands,
    ) -> Result<bool, MnvrError> {
        self.begin_step(time_s)?;

        let speed_ms = self.acc.acc_override(self.start_speed_ms, inputs, time_s);
        commands.set_command(speed_ms, 0.0);

        let completed = inputs.distance_from_route_start() >= self.end_dist_m;
        if completed && self.state != MnvrState::Completed {
            debug!("Maneuver completed at {:.2} m", inputs.distance_from_route_start());
            self.state = MnvrState::Completed;
        }

        Ok(completed)
    }
}

// ---------------------------------------------------------------------------
// TEST HELPERS
// ---------------------------------------------------------------------------
