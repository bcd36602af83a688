//! # Message processor module
//!
//! The message processor routes incoming messages from any source to the update functions of the
//! modules.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::data_store::DataStore;
use comms_if::msg::Msg;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Process a message.
///
/// State updates are published to the maneuver inputs and restarts are carried out immediately,
/// while plans are stored in the datastore to be acted on by the control cycle.
pub fn exec(ds: &mut DataStore, msg: &Msg) {
    match msg {
        Msg::RouteState(r) => ds.mnvr_inputs.on_route_state(r),
        Msg::Velocity(v) => ds.mnvr_inputs.on_velocity(v),
        Msg::Pose(p) => ds.mnvr_inputs.on_pose(p),
        Msg::RoadwayEnvironment(e) => {
            debug!("Roadway environment with {} obstacles", e.obstacles.len());
            ds.mnvr_inputs.on_roadway_environment(e)
        }
        Msg::MnvrPlan(p) => {
            debug!("Received maneuver plan of {} maneuvers", p.mnvrs.len());
            ds.new_plan = Some(p.clone());
        }
        Msg::Restart => ds.restart(),
    }
}
