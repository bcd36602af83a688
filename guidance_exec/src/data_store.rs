//! # Data Store

use comms_if::{
    cmd::{SpeedAccelCmd, Trajectory},
    mnvr::MnvrPlan,
};
use log::info;

use crate::{
    mnvr_exec::{self, MnvrExec},
    mnvr_inputs::MnvrInputs,
    traj_gen::{self, TrajGen},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session elapsed time at the start of this cycle
    pub time_s: f64,

    // Inputs
    pub mnvr_inputs: MnvrInputs,

    /// Maneuver plan received this cycle
    pub new_plan: Option<MnvrPlan>,

    // MnvrExec
    pub mnvr_exec: MnvrExec,
    pub mnvr_exec_output: Option<SpeedAccelCmd>,
    pub mnvr_exec_status_rpt: mnvr_exec::StatusReport,

    // TrajGen
    pub traj_gen: TrajGen,
    pub traj_gen_output: Option<Trajectory>,
    pub traj_gen_status_rpt: Option<traj_gen::StatusReport>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(mnvr_inputs: MnvrInputs, mnvr_exec: MnvrExec, traj_gen: TrajGen) -> Self {
        Self {
            num_cycles: 0,
            time_s: 0.0,
            mnvr_inputs,
            new_plan: None,
            mnvr_exec,
            mnvr_exec_output: None,
            mnvr_exec_status_rpt: mnvr_exec::StatusReport::default(),
            traj_gen,
            traj_gen_output: None,
            traj_gen_status_rpt: None,
            num_consec_cycle_overruns: 0,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle and sets the cycle time.
    pub fn cycle_start(&mut self, time_s: f64) {
        self.time_s = time_s;

        self.new_plan = None;

        self.mnvr_exec_output = None;
        self.mnvr_exec_status_rpt = mnvr_exec::StatusReport::default();
        self.traj_gen_output = None;
        self.traj_gen_status_rpt = None;
    }

    /// Return every module to its initial state.
    ///
    /// Any plan received earlier in the cycle is discarded.
    pub fn restart(&mut self) {
        info!("Restarting guidance");

        self.new_plan = None;
        self.mnvr_inputs.reset();
        self.mnvr_exec.abort();
        self.traj_gen.reset();
    }
}
