//! # Speed up maneuver
//!
//! Accelerates from the start speed to a higher end speed at constant acceleration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

use super::{GuidanceCommands, LongitudinalCore, Mnvr, MnvrError, Params};
use crate::{acc::AccStrategy, mnvr_inputs::InputsSnapshot};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Extra distance allowed at the end of the maneuver, as a time at the end speed.
///
/// Units: seconds
const END_SPEED_MARGIN_S: f64 = 0.2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SpeedUp {
    core: LongitudinalCore,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedUp {
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
        let delta_v_ms = self.core.end_speed_ms - self.core.start_speed_ms;

        if delta_v_ms > 0.0 {
            Ok(delta_v_ms)
        } else {
            Err(MnvrError::NonIncreasingSpeed {
                start_ms: self.core.start_speed_ms,
                end_ms: self.core.end_speed_ms,
            })
        }
    }

    /// Distance covered while accelerating, multiplied by the acceleration.
    fn accel_distance_numerator(&self, delta_v_ms: f64) -> f64 {
        self.core.start_speed_ms * delta_v_ms + 0.5 * delta_v_ms.powi(2)
    }
}

impl Mnvr for SpeedUp {
    fn name(&self) -> &'static str {
        "SpeedUp"
    }

    fn plan(&mut self, inputs: &InputsSnapshot, start_dist_m: f64) -> Result<(), MnvrError> {
        let delta_v_ms = self.delta_v_ms()?;
        let accel_mss = self.core.accel_for_speed_change(delta_v_ms)?;

        let ideal_length_m = self.accel_distance_numerator(delta_v_ms) / accel_mss;
        let delta_t_s = delta_v_ms / accel_mss;
        let lag_dist_m = self.core.start_speed_ms * inputs.response_lag();

        let end_dist_m = start_dist_m
            + ideal_length_m
            + lag_dist_m
            + END_SPEED_MARGIN_S * self.core.end_speed_ms;

        self.core
            .commit_plan(start_dist_m, end_dist_m, accel_mss, delta_t_s);

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
            self.accel_distance_numerator(delta_v_ms) / (end_dist_m - start_dist_m - lag_dist_m);

        if !(accel_mss > 0.0 && accel_mss <= self.core.max_accel_mss) {
            warn!(
                "SpeedUp from {:.2} to {:.2} m/s cannot fit in {:.2} m (needs {:.3} m/s^2), \
                planning at maximum acceleration",
                self.core.start_speed_ms,
                self.core.end_speed_ms,
                end_dist_m - start_dist_m,
                accel_mss
            );
            accel_mss = self.core.max_accel_mss;
        }

        let delta_t_s = delta_v_ms / accel_mss;

        self.core
            .commit_plan(start_dist_m, end_dist_m, accel_mss, delta_t_s);

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
    use crate::{
        acc::AccStrategyFactory,
        mnvr::{test_helpers::*, MnvrState},
        mnvr_inputs::FrontVehicle,
    };
    use comms_if::cmd::SpeedAccelCmd;

    fn speed_up(start_ms: f64, end_ms: f64) -> SpeedUp {
        SpeedUp::new(start_ms, end_ms, &Params::default(), no_acc())
    }

    #[test]
    fn test_plan() {
        let mut mnvr = speed_up(5.0, 10.0);
        mnvr.plan(&inputs_at(0.0, 5.0), 100.0).unwrap();

        // (25 + 12.5)/2.5 = 15 m accelerating, 7 m lag, 2 m margin
        assert_eq!(mnvr.state(), MnvrState::Planned);
        assert!((mnvr.working_accel_mss() - 2.5).abs() < 1e-12);
        assert!((mnvr.delta_t_s() - 2.0).abs() < 1e-12);
        assert!((mnvr.end_dist_m() - 124.0).abs() < 1e-9);
        assert!(mnvr.end_dist_m() > mnvr.start_dist_m());
    }

    #[test]
    fn test_small_speed_change_halves_accel() {
        let mut mnvr = speed_up(5.0, 6.0);
        mnvr.plan(&inputs_at(0.0, 5.0), 0.0).unwrap();

        assert!((mnvr.working_accel_mss() - 1.25).abs() < 1e-12);
        assert!((mnvr.delta_t_s() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_plan_positive_for_all_increases() {
        for (v0, v1) in [(0.0, 0.1), (0.0, 30.0), (12.0, 13.9), (20.0, 22.0)].iter() {
            let mut mnvr = speed_up(*v0, *v1);
            mnvr.plan(&inputs_at(0.0, *v0), 10.0).unwrap();
            assert!(mnvr.working_accel_mss() > 0.0);
            assert!(mnvr.delta_t_s() > 0.0);
            assert!(mnvr.end_dist_m() > 10.0);
        }
    }

    #[test]
    fn test_plan_failure_does_not_mutate() {
        let inputs = inputs_at(0.0, 10.0);

        for (v0, v1) in [(10.0, 10.0), (10.0, 5.0)].iter() {
            let mut mnvr = speed_up(*v0, *v1);
            assert_eq!(
                mnvr.plan(&inputs, 50.0),
                Err(MnvrError::NonIncreasingSpeed {
                    start_ms: *v0,
                    end_ms: *v1
                })
            );
            assert_eq!(mnvr.state(), MnvrState::Unplanned);
            assert_eq!(mnvr.start_dist_m(), 0.0);
            assert_eq!(mnvr.end_dist_m(), 0.0);
            assert_eq!(mnvr.working_accel_mss(), 0.0);
        }

        let mut mnvr = speed_up(5.0, 10.0);
        assert!(matches!(
            mnvr.plan_to_target_distance(&inputs, 50.0, 50.0),
            Err(MnvrError::NonIncreasingDistance { .. })
        ));
        assert_eq!(mnvr.state(), MnvrState::Unplanned);

        let mut mnvr = SpeedUp::new(
            5.0,
            10.0,
            &Params {
                max_accel_mss: 0.0,
                ..Default::default()
            },
            no_acc(),
        );
        assert_eq!(mnvr.plan(&inputs, 0.0), Err(MnvrError::InvalidAccel(0.0)));
        assert_eq!(mnvr.state(), MnvrState::Unplanned);
    }

    #[test]
    fn test_plan_to_target_distance() {
        let mut mnvr = speed_up(0.0, 10.0);
        mnvr.plan_to_target_distance(&inputs_at(0.0, 0.0), 0.0, 50.0)
            .unwrap();

        // 50/50 = 1 m/s^2
        assert!((mnvr.working_accel_mss() - 1.0).abs() < 1e-12);
        assert!((mnvr.delta_t_s() - 10.0).abs() < 1e-12);
        assert_eq!(mnvr.end_dist_m(), 50.0);
    }

    #[test]
    fn test_plan_to_target_distance_fallback() {
        // Far too short, and shorter than the lag distance
        for end_m in [10.0, 2.0].iter() {
            let mut mnvr = speed_up(5.0, 20.0);
            mnvr.plan_to_target_distance(&inputs_at(0.0, 5.0), 0.0, *end_m)
                .unwrap();

            assert_eq!(mnvr.working_accel_mss(), 2.5);
            assert!((mnvr.delta_t_s() - 6.0).abs() < 1e-12);
            assert_eq!(mnvr.end_dist_m(), *end_m);
        }
    }

    #[test]
    fn test_execute_interpolates() {
        let mut mnvr = speed_up(5.0, 10.0);
        let inputs = inputs_at(0.0, 5.0);
        mnvr.plan(&inputs, 0.0).unwrap();

        let mut cmds: Vec<SpeedAccelCmd> = vec![];

        assert_eq!(mnvr.execute_time_step(&inputs, 10.0, &mut cmds), Ok(false));
        assert_eq!(mnvr.state(), MnvrState::Executing);
        assert_eq!(mnvr.execute_time_step(&inputs, 11.0, &mut cmds), Ok(false));
        assert_eq!(mnvr.execute_time_step(&inputs, 12.0, &mut cmds), Ok(true));
        assert_eq!(mnvr.state(), MnvrState::Completed);

        let speeds: Vec<f64> = cmds.iter().map(|c| c.speed_ms).collect();
        assert_eq!(speeds, vec![5.0, 7.5, 10.0]);
        assert!(cmds.iter().all(|c| c.max_accel_mss == 2.5));
    }

    #[test]
    fn test_completion_idempotent() {
        let mut mnvr = speed_up(5.0, 10.0);
        let inputs = inputs_at(0.0, 5.0);
        mnvr.plan(&inputs, 0.0).unwrap();

        let mut cmd = None;
        mnvr.execute_time_step(&inputs, 0.0, &mut cmd).unwrap();

        for t in [2.0, 3.0, 50.0].iter() {
            assert_eq!(mnvr.execute_time_step(&inputs, *t, &mut cmd), Ok(true));
            assert_eq!(mnvr.state(), MnvrState::Completed);
            assert_eq!(cmd.map(|c| c.speed_ms), Some(10.0));
        }
    }

    #[test]
    fn test_execute_errors() {
        let inputs = inputs_at(0.0, 5.0);
        let mut cmd = None;

        let mut mnvr = speed_up(5.0, 10.0);
        assert_eq!(
            mnvr.execute_time_step(&inputs, 0.0, &mut cmd),
            Err(MnvrError::NotPlanned)
        );

        mnvr.plan(&inputs, 0.0).unwrap();
        mnvr.execute_time_step(&inputs, 4.0, &mut cmd).unwrap();

        let mut cmd = None;
        assert_eq!(
            mnvr.execute_time_step(&inputs, 3.0, &mut cmd),
            Err(MnvrError::ClockRegression {
                start_s: 4.0,
                time_s: 3.0
            })
        );
        assert!(cmd.is_none());
    }

    #[test]
    fn test_acc_limits_command() {
        let mut mnvr = SpeedUp::new(
            10.0,
            15.0,
            &Params::default(),
            AccStrategyFactory::default().create(),
        );
        let mut inputs = inputs_at(0.0, 10.0);
        inputs.front_vehicle = Some(FrontVehicle {
            distance_m: 8.0,
            speed_ms: 10.0,
        });
        mnvr.plan(&inputs, 0.0).unwrap();

        let mut cmd = None;
        mnvr.execute_time_step(&inputs, 0.0, &mut cmd).unwrap();

        assert!(mnvr.core().acc().is_engaged());
        assert!(cmd.unwrap().speed_ms < 10.0);
    }
}
