//! # Control cycle
//!
//! Runs the guidance modules once, in order, using the messages already applied to the data
//! store this cycle:
//!
//! 1. A new plan is loaded into the maneuver executive.
//! 2. Trajectory generation runs on the latest inputs and plan.
//! 3. The maneuver executive steps the active maneuver, producing the speed command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};

use crate::{data_store::DataStore, mnvr_exec, traj_gen};
use util::module::State;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Process one control cycle.
pub fn process(ds: &mut DataStore) {
    let snapshot = ds.mnvr_inputs.snapshot();

    if let Some(plan) = &ds.new_plan {
        ds.mnvr_exec.load_plan(plan, &snapshot);
    }

    // TrajGen processing
    let traj_gen_input = traj_gen::InputData {
        snapshot: snapshot.clone(),
        new_plan: ds.new_plan.clone(),
    };
    match ds.traj_gen.proc(&traj_gen_input) {
        Ok((o, r)) => {
            ds.traj_gen_output = o;
            ds.traj_gen_status_rpt = Some(r);
        }
        Err(e) => {
            // A rejected plan only affects the trajectory, maneuvers continue to execute
            warn!("Error during TrajGen processing: {}", e)
        }
    }

    // MnvrExec processing
    let mnvr_exec_input = mnvr_exec::InputData {
        snapshot,
        time_s: ds.time_s,
    };
    match ds.mnvr_exec.proc(&mnvr_exec_input) {
        Ok((o, r)) => {
            ds.mnvr_exec_output = o;
            ds.mnvr_exec_status_rpt = r;
        }
        Err(e) => match e {},
    }

    if let Some(cmd) = ds.mnvr_exec_output {
        trace!(
            "Command: {:.3} m/s, {:.3} m/s^2",
            cmd.speed_ms,
            cmd.max_accel_mss
        );
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        acc,
        mnvr,
        mnvr_exec::MnvrExec,
        mnvr_inputs::{self, MnvrInputs},
        msg_processor,
        traj_gen::{TrajGen, TrajGenStatus},
    };
    use comms_if::msg::Msg;
    use util::script_interpreter::{PendingMsgs, ScriptInterpreter};

    fn data_store(acc_params: acc::Params) -> DataStore {
        let traj_gen_params = traj_gen::Params {
            downsample_stride: 5,
            route_points_m: (0..=50).map(|i| [i as f64, 0.0]).collect(),
            ..Default::default()
        };

        DataStore::new(
            MnvrInputs::new(mnvr_inputs::Params::default()),
            MnvrExec::init(mnvr_exec::InitData {
                mnvr_params: mnvr::Params::default(),
                acc_params,
            })
            .unwrap(),
            TrajGen::init(traj_gen_params).unwrap(),
        )
    }

    /// Run the script up to `time_s` then process a cycle at `time_s`.
    fn run_cycle(ds: &mut DataStore, si: &mut ScriptInterpreter, time_s: f64) {
        ds.cycle_start(time_s);
        if let PendingMsgs::Some(msgs) = si.get_pending_msgs_at(time_s) {
            for msg in msgs.iter() {
                msg_processor::exec(ds, msg);
            }
        }
        process(ds);
    }

    const STRAIGHT_LANE_SCRIPT: &str = r#"
        0.0: {"type": "POSE", "payload": {"x_m": 0.0, "y_m": 0.0, "heading_rad": 0.0}};
        0.0: {"type": "ROUTE_STATE", "payload": {"downtrack_m": 0.0, "lane_index": 0}};
        0.0: {"type": "MNVR_PLAN", "payload": {"mnvrs": [{"LaneFollowing": {"start_dist_m": 0.0, "end_dist_m": 50.0, "start_speed_ms": 0.0, "end_speed_ms": 10.0}}]}};
        20.0: {"type": "RESTART"};
    "#;

    #[test]
    fn test_straight_lane() {
        let mut ds = data_store(acc::Params::default());
        let mut si = ScriptInterpreter::from_script_str(STRAIGHT_LANE_SCRIPT).unwrap();

        run_cycle(&mut ds, &mut si, 0.0);

        let traj = ds.traj_gen_output.clone().unwrap();
        assert_eq!(traj.points.len(), 11);
        for p in traj.points.iter() {
            assert_eq!(p.speed_ms, 10.0);
            assert!(p.yaw_rad.abs() < 1e-9);
            assert_eq!(p.curv_m, 0.0);
        }

        // 50 m from standstill gives 1 m/s^2 over 10 s
        let cmd = ds.mnvr_exec_output.unwrap();
        assert_eq!(cmd.speed_ms, 0.0);
        assert!((cmd.max_accel_mss - 1.0).abs() < 1e-9);

        run_cycle(&mut ds, &mut si, 5.0);
        assert!((ds.mnvr_exec_output.unwrap().speed_ms - 5.0).abs() < 1e-9);
        assert_eq!(
            ds.traj_gen_status_rpt.map(|r| r.status),
            Some(TrajGenStatus::Unchanged)
        );

        run_cycle(&mut ds, &mut si, 10.0);
        assert!(ds.mnvr_exec_status_rpt.mnvr_completed);
        assert_eq!(ds.mnvr_exec.num_queued(), 0);

        // Restart clears the plan
        run_cycle(&mut ds, &mut si, 20.0);
        assert!(ds.traj_gen.trajectory().is_none());
        assert!(ds.mnvr_exec_output.is_none());
    }

    const ACC_SCRIPT: &str = r#"
        0.0: {"type": "VELOCITY", "payload": {"linear_x_ms": 10.0}};
        0.0: {"type": "ROUTE_STATE", "payload": {"downtrack_m": 0.0, "lane_index": 1}};
        0.0: {"type": "ROADWAY_ENVIRONMENT", "payload": {"obstacles": [{"downtrack_m": 8.5, "primary_lane": 1, "object": {"position_m": [8.5, 0.0, 0.0], "size_m": [2.0, 1.0, 0.75], "velocity_ms": [0.0, 0.0, 0.0]}}]}};
        0.0: {"type": "MNVR_PLAN", "payload": {"mnvrs": [{"LaneFollowing": {"start_dist_m": 0.0, "end_dist_m": 100.0, "start_speed_ms": 10.0, "end_speed_ms": 15.0}}]}};
    "#;

    #[test]
    fn test_acc_braking() {
        let mut ds = data_store(acc::Params {
            desired_time_gap_s: 1.5,
            ..Default::default()
        });
        let mut si = ScriptInterpreter::from_script_str(ACC_SCRIPT).unwrap();

        run_cycle(&mut ds, &mut si, 0.0);

        let snapshot = ds.mnvr_inputs.snapshot();
        assert!((snapshot.distance_to_front_vehicle() - 8.0).abs() < 1e-9);

        // The speed up would command 10 m/s on its first step, but the gap is (8 - 5)/10 = 0.3 s
        // against 1.5 s desired, a reduction to 8.8 m/s. The 14 m covered during the response
        // lag also exceeds the 3 m free, capping the command at 3/1.4 m/s.
        let cmd = ds.mnvr_exec_output.unwrap();
        assert_eq!(ds.mnvr_exec_status_rpt.active_mnvr, Some("SpeedUp"));
        assert!(ds.mnvr_exec_status_rpt.acc_engaged);
        assert!(cmd.speed_ms < 10.0);
        assert!((cmd.speed_ms - 3.0 / 1.4).abs() < 1e-9);
        assert!(cmd.max_accel_mss > 0.0);
    }

    #[test]
    fn test_acc_disabled() {
        let mut ds = data_store(acc::Params {
            enabled: false,
            ..Default::default()
        });
        let mut si = ScriptInterpreter::from_script_str(ACC_SCRIPT).unwrap();

        run_cycle(&mut ds, &mut si, 0.0);

        assert_eq!(ds.mnvr_exec_output.map(|c| c.speed_ms), Some(10.0));
        assert!(!ds.mnvr_exec_status_rpt.acc_engaged);
    }

    #[test]
    fn test_no_plan() {
        let mut ds = data_store(acc::Params::default());

        ds.cycle_start(0.0);
        msg_processor::exec(&mut ds, &Msg::Restart);
        process(&mut ds);

        assert!(ds.mnvr_exec_output.is_none());
        assert!(ds.traj_gen_output.is_none());
        assert_eq!(
            ds.traj_gen_status_rpt.map(|r| r.status),
            Some(TrajGenStatus::NoPlan)
        );
    }
}
