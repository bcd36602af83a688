//! # Basic adaptive cruise control strategy
//!
//! Follows the front vehicle by regulating the time gap to it. The strategy engages when the gap
//! drops below the desired gap, or when the vehicle could no longer slow to the front vehicle's
//! speed within the free distance. Once engaged it stays engaged until the gap has opened past
//! `desired_time_gap_s * exit_distance_factor` and the braking margin is restored.
//!
//! While engaged the command is limited twice. A gap shorter than desired is fed through the
//! filter pipeline and the resulting adjustment subtracted from the command. If the braking
//! margin is exceeded the command is also capped at the highest speed from which the vehicle can
//! still slow to the front vehicle's speed within the free distance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};

use super::{AccStrategy, Params, SPEED_EPSILON_MS};
use crate::{
    mnvr_inputs::InputsSnapshot,
    signals::{Filter, Pipeline, Signal},
};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BasicAccStrategy {
    params: Params,

    /// Filters turning the observed time gap into a speed reduction
    pipeline: Pipeline,

    engaged: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BasicAccStrategy {
    pub fn new(params: Params, pipeline: Pipeline) -> Self {
        Self {
            params,
            pipeline,
            engaged: false,
        }
    }

    fn disengage(&mut self) {
        if self.engaged {
            debug!("ACC disengaged");
        }
        self.engaged = false;
        self.pipeline.reset();
    }

    /// Distance needed to slow from `speed_ms` to `front_speed_ms` at maximum deceleration, plus
    /// the distance covered during the response lag.
    fn stopping_dist_m(&self, speed_ms: f64, front_speed_ms: f64, lag_s: f64) -> f64 {
        let braking_dist_m = if speed_ms > front_speed_ms && self.params.max_decel_mss > 0.0 {
            (speed_ms.powi(2) - front_speed_ms.powi(2)) / (2.0 * self.params.max_decel_mss)
        } else {
            0.0
        };

        braking_dist_m + speed_ms * lag_s
    }

    /// Highest speed whose stopping distance is within `free_dist_m`.
    ///
    /// Inverts `stopping_dist_m`, which is continuous and increasing in speed. Above the front
    /// vehicle's speed this is the positive root of
    /// `v^2 + 2*a*lag*v - (2*a*free + vf^2) = 0`, below it only the lag distance counts.
    fn braking_limit_ms(&self, front_speed_ms: f64, free_dist_m: f64, lag_s: f64) -> f64 {
        let lag_s = lag_s.max(0.0);
        let lag_limit_ms = if lag_s > 0.0 {
            (free_dist_m / lag_s).max(0.0)
        } else if free_dist_m > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let decel_mss = self.params.max_decel_mss;
        if decel_mss <= 0.0 || lag_limit_ms <= front_speed_ms {
            return lag_limit_ms;
        }

        let b = decel_mss * lag_s;
        let disc = b.powi(2) + 2.0 * decel_mss * free_dist_m + front_speed_ms.powi(2);

        (disc.max(0.0).sqrt() - b).max(0.0)
    }
}

impl AccStrategy for BasicAccStrategy {
    fn acc_override(&mut self, cmd_speed_ms: f64, inputs: &InputsSnapshot, time_s: f64) -> f64 {
        let front = match inputs.front_vehicle {
            Some(f) => f,
            None => {
                self.disengage();
                return cmd_speed_ms;
            }
        };

        let speed_ms = inputs.current_speed();
        if speed_ms < SPEED_EPSILON_MS {
            self.disengage();
            return cmd_speed_ms;
        }

        let free_dist_m = front.distance_m - self.params.min_standoff_m;
        let time_gap_s = free_dist_m / speed_ms;

        let lag_s = inputs.response_lag();
        let braking_margin_exceeded =
            self.stopping_dist_m(speed_ms, front.speed_ms, lag_s) >= free_dist_m;

        if self.engaged {
            if time_gap_s > self.params.desired_time_gap_s * self.params.exit_distance_factor
                && !braking_margin_exceeded
            {
                self.disengage();
                return cmd_speed_ms;
            }
        } else if time_gap_s < self.params.desired_time_gap_s || braking_margin_exceeded {
            debug!(
                "ACC engaged: time gap {:.2} s, front vehicle at {:.2} m",
                time_gap_s, front.distance_m
            );
            self.engaged = true;
        } else {
            return cmd_speed_ms;
        }

        // The pipeline only sees a gap deficit, so no opposing integral builds up while the gap
        // is long enough
        let adjustment = if time_gap_s < self.params.desired_time_gap_s {
            self.pipeline.apply(Signal::new(time_gap_s, time_s)).value
        } else {
            self.pipeline.reset();
            0.0
        };

        let mut speed = cmd_speed_ms - adjustment;
        if braking_margin_exceeded {
            speed = speed.min(self.braking_limit_ms(front.speed_ms, free_dist_m, lag_s));
        }
        let speed = clamp(&speed, &0.0, &cmd_speed_ms.max(0.0));

        trace!(
            "ACC override: gap {:.3} s, adjustment {:.3}, {:.3} -> {:.3} m/s",
            time_gap_s,
            adjustment,
            cmd_speed_ms,
            speed
        );

        speed
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
