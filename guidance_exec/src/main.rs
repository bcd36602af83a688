//! Main guidance executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Message acquisition from the script
//!         - Message processing, updating the maneuver inputs
//!         - Trajectory generation
//!         - Maneuver execution, producing the speed command
//!
//! # Modules
//!
//! All cyclic modules (e.g. `traj_gen`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use guidance_lib::{
    acc, control_cycle,
    data_store::DataStore,
    mnvr, mnvr_exec,
    mnvr_exec::MnvrExec,
    mnvr_inputs::{self, MnvrInputs},
    msg_processor,
    params::GuidanceExecParams,
    traj_gen::{self, TrajGen},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    params,
    script_interpreter::{PendingMsgs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("guidance_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Guidance Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GuidanceExecParams = params::load_or_default("guidance_exec.toml")
        .wrap_err("Could not load exec params")?;
    let mnvr_inputs_params: mnvr_inputs::Params = params::load_or_default("mnvr_inputs.toml")
        .wrap_err("Could not load maneuver inputs params")?;
    let acc_params: acc::Params =
        params::load_or_default("acc.toml").wrap_err("Could not load ACC params")?;
    let mnvr_params: mnvr::Params =
        params::load_or_default("mnvr.toml").wrap_err("Could not load maneuver params")?;
    let traj_gen_params: traj_gen::Params =
        params::load_or_default("traj_gen.toml").wrap_err("Could not load TrajGen params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MESSAGE SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script = match args.len() {
        // If we have a single argument use it as the script path
        2 => {
            info!("Loading script from \"{}\"", &args[1]);

            let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} messages\n",
                si.get_duration(),
                si.get_num_msgs()
            );

            Some(si)
        }
        1 => {
            warn!("No script provided, no messages will be received\n");
            None
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mnvr_exec = MnvrExec::init(mnvr_exec::InitData {
        mnvr_params,
        acc_params,
    })
    .wrap_err("Failed to initialise MnvrExec")?;
    info!("MnvrExec init complete");

    let traj_gen = TrajGen::init(traj_gen_params).wrap_err("Failed to initialise TrajGen")?;
    info!("TrajGen init complete");

    let mut ds = DataStore::new(MnvrInputs::new(mnvr_inputs_params), mnvr_exec, traj_gen);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(session::get_elapsed_seconds());

        // ---- MESSAGE PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_msgs_at(ds.time_s) {
                PendingMsgs::None => (),
                PendingMsgs::Some(msgs) => {
                    for msg in msgs.iter() {
                        msg_processor::exec(&mut ds, msg);
                    }
                }
                // Exit if end of script reached
                PendingMsgs::EndOfScript => {
                    if exec_params.exit_at_end_of_script {
                        info!("End of message script reached, stopping");
                        break;
                    }
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        control_cycle::process(&mut ds);

        if exec_params.save_trajectories {
            if let Some(ref traj) = ds.traj_gen_output {
                session.save(
                    format!("traj_gen/trajectory_{:06}.json", ds.num_cycles),
                    traj.clone(),
                );
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    session.exit();

    info!("End of execution");

    Ok(())
}
