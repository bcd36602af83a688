//! # Maneuver Executive
//!
//! Owns the queue of planned maneuvers and steps the active one each control cycle. A fault in a
//! maneuver ends only that maneuver, the executive moving on to the next in the queue.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{collections::VecDeque, convert::Infallible, sync::Arc};

use comms_if::{
    cmd::SpeedAccelCmd,
    mnvr::{LaneFollowingMnvr, Mnvr as MnvrMsg, MnvrPlan},
};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    acc::{self, AccStrategyFactory},
    mnvr::{self, Mnvr, MnvrError, SlowDown, SpeedUp, SteadySpeed},
    mnvr_inputs::InputsSnapshot,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Maneuver executive state
#[derive(Debug)]
pub struct MnvrExec {
    params: mnvr::Params,

    acc_factory: AccStrategyFactory,

    queue: VecDeque<Box<dyn Mnvr>>,
}

/// Initialisation data for the executive
#[derive(Debug, Clone, Default)]
pub struct InitData {
    pub mnvr_params: mnvr::Params,
    pub acc_params: acc::Params,
}

/// Input data for one cycle of the executive
#[derive(Debug, Clone)]
pub struct InputData {
    /// Maneuver inputs at the start of the cycle
    pub snapshot: Arc<InputsSnapshot>,

    /// Current time.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Status of one cycle of the executive
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Name of the maneuver stepped this cycle
    pub active_mnvr: Option<&'static str>,

    /// Number of maneuvers remaining after this cycle
    pub num_queued: usize,

    /// The active maneuver completed this cycle
    pub mnvr_completed: bool,

    /// The active maneuver faulted this cycle and was dropped
    pub mnvr_faulted: bool,

    /// ACC of the active maneuver is following a front vehicle
    pub acc_engaged: bool,
}

/// Result of loading a maneuver plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub num_loaded: usize,
    pub num_skipped: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MnvrExec {
    pub fn new(params: mnvr::Params, acc_factory: AccStrategyFactory) -> Self {
        Self {
            params,
            acc_factory,
            queue: VecDeque::new(),
        }
    }

    /// Replace the queue with the maneuvers of a new plan.
    ///
    /// Each lane following maneuver is planned between its own start and end distances. Other
    /// maneuver kinds, and any maneuver which fails to plan, are skipped.
    pub fn load_plan(&mut self, plan: &MnvrPlan, snapshot: &InputsSnapshot) -> LoadReport {
        let mut report = LoadReport::default();

        self.queue.clear();

        for (i, msg) in plan.mnvrs.iter().enumerate() {
            let lf = match msg {
                MnvrMsg::LaneFollowing(lf) => lf,
                other => {
                    warn!(
                        "Maneuver {} is a {} maneuver which cannot be executed, skipping",
                        i,
                        other.kind()
                    );
                    report.num_skipped += 1;
                    continue;
                }
            };

            match self.build_mnvr(lf, snapshot) {
                Ok(m) => {
                    debug!(
                        "Loaded {} from {:.2} m to {:.2} m",
                        m.name(),
                        m.start_dist_m(),
                        m.end_dist_m()
                    );
                    self.queue.push_back(m);
                    report.num_loaded += 1;
                }
                Err(e) => {
                    warn!("Maneuver {} could not be planned, skipping: {}", i, e);
                    report.num_skipped += 1;
                }
            }
        }

        info!(
            "Maneuver plan loaded: {} queued, {} skipped",
            report.num_loaded, report.num_skipped
        );

        report
    }

    /// Drop all queued maneuvers, including the active one.
    pub fn abort(&mut self) {
        if !self.queue.is_empty() {
            info!("Aborting {} maneuvers", self.queue.len());
        }
        self.queue.clear();
    }

    pub fn num_queued(&self) -> usize {
        self.queue.len()
    }

    pub fn active(&self) -> Option<&dyn Mnvr> {
        self.queue.front().map(|m| m.as_ref())
    }

    /// Build and plan the maneuver matching the speed change of a lane following segment.
    fn build_mnvr(
        &self,
        lf: &LaneFollowingMnvr,
        snapshot: &InputsSnapshot,
    ) -> Result<Box<dyn Mnvr>, MnvrError> {
        let delta_v_ms = lf.end_speed_ms - lf.start_speed_ms;
        let acc = self.acc_factory.create();

        let mut mnvr: Box<dyn Mnvr> = if delta_v_ms > self.params.steady_speed_tolerance_ms {
            Box::new(SpeedUp::new(
                lf.start_speed_ms,
                lf.end_speed_ms,
                &self.params,
                acc,
            ))
        } else if -delta_v_ms > self.params.steady_speed_tolerance_ms {
            Box::new(SlowDown::new(
                lf.start_speed_ms,
                lf.end_speed_ms,
                &self.params,
                acc,
            ))
        } else {
            Box::new(SteadySpeed::new(
                lf.start_speed_ms,
                lf.end_speed_ms,
                &self.params,
                acc,
            ))
        };

        mnvr.plan_to_target_distance(snapshot, lf.start_dist_m, lf.end_dist_m)?;

        Ok(mnvr)
    }
}

impl State for MnvrExec {
    type InitData = InitData;
    type InitError = Infallible;

    type InputData = InputData;
    type OutputData = Option<SpeedAccelCmd>;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        Ok(Self::new(
            init_data.mnvr_params,
            AccStrategyFactory::new(init_data.acc_params),
        ))
    }

    /// Step the active maneuver.
    ///
    /// Outputs the command issued this cycle, or `None` if no maneuver is active or the active
    /// maneuver faulted.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut report = StatusReport::default();
        let mut cmd: Option<SpeedAccelCmd> = None;

        let mnvr = match self.queue.front_mut() {
            Some(m) => m,
            None => return Ok((None, report)),
        };

        report.active_mnvr = Some(mnvr.name());

        match mnvr.execute_time_step(&input_data.snapshot, input_data.time_s, &mut cmd) {
            Ok(completed) => {
                report.acc_engaged = mnvr.core().acc().is_engaged();
                if completed {
                    info!("{} maneuver complete", mnvr.name());
                    report.mnvr_completed = true;
                    self.queue.pop_front();
                }
            }
            Err(e) => {
                error!("{} maneuver faulted and has been dropped: {}", mnvr.name(), e);
                report.mnvr_faulted = true;
                cmd = None;
                self.queue.pop_front();
            }
        }

        report.num_queued = self.queue.len();

        Ok((cmd, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::mnvr::StopMnvr;

    fn lane_following(start_m: f64, end_m: f64, v0: f64, v1: f64) -> MnvrMsg {
        MnvrMsg::LaneFollowing(LaneFollowingMnvr {
            start_dist_m: start_m,
            end_dist_m: end_m,
            start_speed_ms: v0,
            end_speed_ms: v1,
        })
    }

    fn exec() -> MnvrExec {
        MnvrExec::init(InitData::default()).unwrap()
    }

    fn input(time_s: f64) -> InputData {
        InputData {
            snapshot: Arc::new(InputsSnapshot {
                response_lag_s: 1.4,
                ..Default::default()
            }),
            time_s,
        }
    }

    #[test]
    fn test_load_plan() {
        let mut exec = exec();
        let plan = MnvrPlan {
            mnvrs: vec![
                lane_following(0.0, 50.0, 0.0, 10.0),
                lane_following(50.0, 100.0, 10.0, 10.0),
                MnvrMsg::Stop(StopMnvr {
                    start_dist_m: 100.0,
                    end_dist_m: 120.0,
                    start_speed_ms: 10.0,
                }),
                // Cannot be planned, end before start
                lane_following(120.0, 110.0, 10.0, 5.0),
                lane_following(120.0, 160.0, 10.0, 5.0),
            ],
        };

        let report = exec.load_plan(&plan, &input(0.0).snapshot);

        assert_eq!(
            report,
            LoadReport {
                num_loaded: 3,
                num_skipped: 2
            }
        );
        assert_eq!(exec.active().map(|m| m.name()), Some("SpeedUp"));
    }

    #[test]
    fn test_stationary_segment_skipped() {
        let mut exec = exec();
        let plan = MnvrPlan {
            mnvrs: vec![
                lane_following(0.0, 50.0, 0.0, 0.0),
                lane_following(50.0, 100.0, 0.0, 10.0),
            ],
        };

        let report = exec.load_plan(&plan, &input(0.0).snapshot);

        assert_eq!(
            report,
            LoadReport {
                num_loaded: 1,
                num_skipped: 1
            }
        );
        assert_eq!(exec.active().map(|m| m.name()), Some("SpeedUp"));
    }

    #[test]
    fn test_steps_through_queue() {
        let mut exec = exec();
        let plan = MnvrPlan {
            mnvrs: vec![
                lane_following(0.0, 50.0, 0.0, 10.0),
                lane_following(50.0, 90.0, 10.0, 2.0),
            ],
        };
        exec.load_plan(&plan, &input(0.0).snapshot);

        // First maneuver takes 10 s at 1 m/s^2
        let (cmd, report) = exec.proc(&input(0.0)).unwrap();
        assert_eq!(cmd.map(|c| c.speed_ms), Some(0.0));
        assert_eq!(report.active_mnvr, Some("SpeedUp"));

        let (cmd, report) = exec.proc(&input(10.0)).unwrap();
        assert_eq!(cmd.map(|c| c.speed_ms), Some(10.0));
        assert!(report.mnvr_completed);
        assert_eq!(report.num_queued, 1);

        let (_, report) = exec.proc(&input(10.1)).unwrap();
        assert_eq!(report.active_mnvr, Some("SlowDown"));
    }

    #[test]
    fn test_fault_drops_only_active_mnvr() {
        let mut exec = exec();
        let plan = MnvrPlan {
            mnvrs: vec![
                lane_following(0.0, 50.0, 0.0, 10.0),
                lane_following(50.0, 100.0, 10.0, 10.0),
            ],
        };
        exec.load_plan(&plan, &input(0.0).snapshot);

        exec.proc(&input(5.0)).unwrap();

        // Time goes backwards
        let (cmd, report) = exec.proc(&input(4.0)).unwrap();
        assert!(cmd.is_none());
        assert!(report.mnvr_faulted);
        assert_eq!(report.num_queued, 1);

        let (cmd, report) = exec.proc(&input(6.0)).unwrap();
        assert_eq!(report.active_mnvr, Some("SteadySpeed"));
        assert_eq!(cmd.map(|c| c.speed_ms), Some(10.0));
    }

    #[test]
    fn test_abort() {
        let mut exec = exec();
        let plan = MnvrPlan {
            mnvrs: vec![lane_following(0.0, 50.0, 0.0, 10.0)],
        };
        exec.load_plan(&plan, &input(0.0).snapshot);
        exec.proc(&input(0.0)).unwrap();

        exec.abort();

        assert_eq!(exec.num_queued(), 0);
        let (cmd, report) = exec.proc(&input(1.0)).unwrap();
        assert!(cmd.is_none());
        assert!(report.active_mnvr.is_none());
    }
}
