//! # Steady speed maneuver
//!
//! Holds a constant speed over a distance. The maneuver completes once the vehicle reaches the
//! end distance rather than after a fixed time.

use super::{GuidanceCommands, LongitudinalCore, Mnvr, MnvrError, Params};
use crate::{acc::AccStrategy, mnvr_inputs::InputsSnapshot};

#[derive(Debug)]
pub struct SteadySpeed {
    core: LongitudinalCore,
    min_duration_s: f64,
    speed_tolerance_ms: f64,
}

impl SteadySpeed {
    pub fn new(
        start_speed_ms: f64,
        end_speed_ms: f64,
        params: &Params,
        acc: Box<dyn AccStrategy>,
    ) -> Self {
        Self {
            core: LongitudinalCore::new(start_speed_ms, end_speed_ms, params, acc),
            min_duration_s: params.steady_min_duration_s,
            speed_tolerance_ms: params.steady_speed_tolerance_ms,
        }
    }

    fn check_steady(&self) -> Result<(), MnvrError> {
        if (self.core.end_speed_ms - self.core.start_speed_ms).abs() <= self.speed_tolerance_ms {
            Ok(())
        } else {
            Err(MnvrError::SpeedNotSteady {
                start_ms: self.core.start_speed_ms,
                end_ms: self.core.end_speed_ms,
                tol_ms: self.speed_tolerance_ms,
            })
        }
    }

    /// Expected time to cover the distance, or the minimum duration when stationary.
    fn duration_s(&self, length_m: f64) -> f64 {
        if self.core.start_speed_ms > 0.0 {
            length_m / self.core.start_speed_ms
        } else {
            self.min_duration_s
        }
    }
}

impl Mnvr for SteadySpeed {
    fn name(&self) -> &'static str {
        "SteadySpeed"
    }

    fn plan(&mut self, _inputs: &InputsSnapshot, start_dist_m: f64) -> Result<(), MnvrError> {
        self.check_steady()?;

        let length_m = self.core.start_speed_ms * self.min_duration_s;
        let duration_s = self.duration_s(length_m);

        self.core
            .commit_plan(start_dist_m, start_dist_m + length_m, 0.0, duration_s);

        Ok(())
    }

    fn plan_to_target_distance(
        &mut self,
        _inputs: &InputsSnapshot,
        start_dist_m: f64,
        end_dist_m: f64,
    ) -> Result<(), MnvrError> {
        self.check_steady()?;
        if end_dist_m <= start_dist_m {
            return Err(MnvrError::NonIncreasingDistance {
                start_m: start_dist_m,
                end_m: end_dist_m,
            });
        }

        // Completion is on distance, which a stationary vehicle never reaches
        if self.core.start_speed_ms <= 0.0 {
            return Err(MnvrError::StationaryOverDistance {
                speed_ms: self.core.start_speed_ms,
                length_m: end_dist_m - start_dist_m,
            });
        }

        let duration_s = self.duration_s(end_dist_m - start_dist_m);
        self.core
            .commit_plan(start_dist_m, end_dist_m, 0.0, duration_s);

        Ok(())
    }

    fn execute_time_step(
        &mut self,
        inputs: &InputsSnapshot,
        time_s: f64,
        commands: &mut dyn GuidanceCommands,
    ) -> Result<bool, MnvrError> {
        self.core.constant_speed_step(inputs, time_s, commands)
    }

    fn core(&self) -> &LongitudinalCore {
        &self.core
    }
}
