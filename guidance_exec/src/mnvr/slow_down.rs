//! # Slow down maneuver
//!
//! Decelerates from the start speed to a lower end speed at constant deceleration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

use super::{GuidanceCommands, LongitudinalCore, Mnvr, MnvrError, Params};
use crate::{acc::AccStrategy, mnvr_inputs::InputsSnapshot};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SlowDown {
    core: LongitudinalCore,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SlowDown {
    pub fn new(
        start_speed_ms: f64,
        end_speed_ms: f64,
        params: &Params,
        acc: Box<dyn AccStrategy>,
    ) -> Self {
        Self {
            core: LongitudinalCore::new(start_speed_ms, end_speed_ms, params, acc),
        }
    }

    fn delta_v_ms(&self) -> Result<f64, MnvrError> {
        let delta_v_ms = self.core.start_speed_ms - self.core.end_speed_ms;

        if delta_v_ms > 0.0 {
            Ok(delta_v_ms)
        } else {
            Err(MnvrError::NonDecreasingSpeed {
                start_ms: self.core.start_speed_ms,
                end_ms: self.core.end_speed_ms,
            })
        }
    }

    fn decel_distance_numerator(&self, delta_v_ms: f64) -> f64 {
        self.core.end_speed_ms * delta_v_ms + 0.5 * delta_v_ms.powi(2)
    }
}

impl Mnvr for SlowDown {
    fn name(&self) -> &'static str {
        "SlowDown"
    }

    fn plan(&mut self, inputs: &InputsSnapshot, start_dist_m: f64) -> Result<(), MnvrError> {
        let delta_v_ms = self.delta_v_ms()?;
        let accel_mss = self.core.accel_for_speed_change(delta_v_ms)?;

        let ideal_length_m = self.decel_distance_numerator(delta_v_ms) / accel_mss;
        let delta_t_s = delta_v_ms / accel_mss;
        let lag_dist_m = self.core.start_speed_ms * inputs.response_lag();

        self.core.commit_plan(
            start_dist_m,
            start_dist_m + ideal_length_m + lag_dist_m,
            accel_mss,
            delta_t_s,
        );

        Ok(())
    }

    fn plan_to_target_distance(
        &mut self,
        inputs: &InputsSnapshot,
        start_dist_m: f64,
        end_dist_m: f64,
    ) -> Result<(), MnvrError> {
        let delta_v_ms = self.delta_v_ms()?;
        if end_dist_m <= start_dist_m {
            return Err(MnvrError::NonIncreasingDistance {
                start_m: start_dist_m,
                end_m: end_dist_m,
            });
        }
        if self.core.max_accel_mss <= 0.0 || !self.core.max_accel_mss.is_finite() {
            return Err(MnvrError::InvalidAccel(self.core.max_accel_mss));
        }

        let lag_dist_m = self.core.start_speed_ms * inputs.response_lag();
        let mut accel_mss =
            self.decel_distance_numerator(delta_v_ms) / (end_dist_m - start_dist_m - lag_dist_m);

        if !(accel_mss > 0.0 && accel_mss <= self.core.max_accel_mss) {
            warn!(
                "SlowDown from {:.2} to {:.2} m/s cannot fit in {:.2} m (needs {:.3} m/s^2), \
                planning at maximum deceleration",
                self.core.start_speed_ms,
                self.core.end_speed_ms,
                end_dist_m - start_dist_m,
                accel_mss
            );
            accel_mss = self.core.max_accel_mss;
        }

        self.core.commit_plan(
            start_dist_m,
            end_dist_m,
            accel_mss,
            delta_v_ms / accel_mss,
        );

        Ok(())
    }

    fn execute_time_step(
        &mut self,
        inputs: &InputsSnapshot,
        time_s: f64,
        commands: &mut dyn GuidanceCommands,
    ) -> Result<bool, MnvrError> {
        self.core.interpolate_step(inputs, time_s, commands)
    }

    fn core(&self) -> &LongitudinalCore {
        &self.core
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::mnvr::{test_helpers::*, MnvrState};

    fn slow_down(start_ms: f64, end_ms: f64) -> SlowDown {
        SlowDown::new(start_ms, end_ms, &Params::default(), no_acc())
    }

    #[test]
    fn test_plan() {
        let mut mnvr = slow_down(10.0, 5.0);
        mnvr.plan(&inputs_at(0.0, 10.0), 0.0).unwrap();

        // (25 + 12.5)/2.5 = 15 m decelerating, 14 m lag
        assert_eq!(mnvr.state(), MnvrState::Planned);
        assert!((mnvr.delta_t_s() - 2.0).abs() < 1e-12);
        assert!((mnvr.end_dist_m() - 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_failure_does_not_mutate() {
        let mut mnvr = slow_down(5.0, 10.0);
        assert!(matches!(
            mnvr.plan(&inputs_at(0.0, 5.0), 10.0),
            Err(MnvrError::NonDecreasingSpeed { .. })
        ));
        assert_eq!(mnvr.state(), MnvrState::Unplanned);
        assert_eq!(mnvr.end_dist_m(), 0.0);
    }

    #[test]
    fn test_plan_to_target_distance() {
        let mut mnvr = slow_down(10.0, 0.0);
        mnvr.plan_to_target_distance(&inputs_at(0.0, 10.0), 0.0, 34.0)
            .unwrap();

        // 50/(34 - 14)
        assert!((mnvr.working_accel_mss() - 2.5).abs() < 1e-12);
        assert!((mnvr.delta_t_s() - 4.0).abs() < 1e-12);
        assert_eq!(mnvr.end_dist_m(), 34.0);
    }

    #[test]
    fn test_execute_to_stop() {
        let mut mnvr = slow_down(10.0, 0.0);
        let inputs = inputs_at(0.0, 10.0);
        mnvr.plan(&inputs, 0.0).unwrap();

        let mut cmd = None;
        assert_eq!(mnvr.execute_time_step(&inputs, 1.0, &mut cmd), Ok(false));
        assert_eq!(mnvr.execute_time_step(&inputs, 3.0, &mut cmd), Ok(false));
        assert!((cmd.unwrap().speed_ms - 5.0).abs() < 1e-12);
        assert_eq!(mnvr.execute_time_step(&inputs, 5.0, &mut cmd), Ok(true));
        assert_eq!(cmd.unwrap().speed_ms, 0.0);
    }
}
