//! Implementations for the TrajGen state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use comms_if::{
    cmd::Trajectory,
    mnvr::{Mnvr as MnvrMsg, MnvrPlan},
};
use log::{debug, info, warn};
use nalgebra::Point2;
use serde::Serialize;

use super::{generate_trajectory, Params, PolylineRoadModel, RoadModel, TrajGenError};
use crate::mnvr_inputs::InputsSnapshot;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory generation module state
pub struct TrajGen {
    params: Params,

    road_model: Option<Box<dyn RoadModel>>,

    /// Maneuvers of the current plan
    mnvrs: Option<Vec<MnvrMsg>>,

    /// The most recently generated trajectory
    trajectory: Option<Trajectory>,

    /// Downtrack distance of the last generation attempt
    last_gen_dist_m: Option<f64>,
}

/// Input data to trajectory generation.
#[derive(Debug, Clone)]
pub struct InputData {
    pub snapshot: Arc<InputsSnapshot>,

    /// A new maneuver plan, or `None` if there is no new plan this cycle.
    pub new_plan: Option<MnvrPlan>,
}

/// Outcome of a cycle of trajectory generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrajGenStatus {
    /// There is no plan to generate a trajectory for
    NoPlan,

    /// There is no road geometry to generate a trajectory on
    NoRoadModel,

    /// The current trajectory is still valid
    Unchanged,

    /// A new trajectory was generated
    Generated,

    /// No curve could be fitted, the previous trajectory is kept
    FitUnavailable,
}

/// Status report for trajectory generation processing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub status: TrajGenStatus,

    /// Number of points in the current trajectory
    pub num_points: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajGen {
    /// Create the module with an explicit road model.
    pub fn with_road_model(params: Params, road_model: Box<dyn RoadModel>) -> Self {
        Self {
            params,
            road_model: Some(road_model),
            mnvrs: None,
            trajectory: None,
            last_gen_dist_m: None,
        }
    }

    /// The most recently generated trajectory.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Drop the current plan and trajectory.
    pub fn reset(&mut self) {
        self.mnvrs = None;
        self.trajectory = None;
        self.last_gen_dist_m = None;
    }

    fn report(&self, status: TrajGenStatus) -> StatusReport {
        StatusReport {
            status,
            num_points: self.trajectory.as_ref().map(|t| t.points.len()).unwrap_or(0),
        }
    }
}

impl State for TrajGen {
    type InitData = Params;
    type InitError = TrajGenError;

    type InputData = InputData;
    type OutputData = Option<Trajectory>;
    type StatusReport = StatusReport;
    type ProcError = TrajGenError;

    /// Initialise the module, building the road model from the route points in the parameters.
    ///
    /// If there are no route points the module runs without a road model and never generates a
    /// trajectory.
    fn init(params: Self::InitData) -> Result<Self, Self::InitError> {
        let road_model: Option<Box<dyn RoadModel>> = if params.route_points_m.is_empty() {
            warn!("No route points in the parameters, trajectory generation is disabled");
            None
        } else {
            let points: Vec<Point2<f64>> = params
                .route_points_m
                .iter()
                .map(|p| Point2::new(p[0], p[1]))
                .collect();
            let road = PolylineRoadModel::from_centerline(&points, params.points_per_lanelet)?;
            info!(
                "Road model of {:.1} m in {} lanelets",
                road.length_m(),
                road.lanelets().len()
            );
            Some(Box::new(road))
        };

        Ok(Self {
            params,
            road_model,
            mnvrs: None,
            trajectory: None,
            last_gen_dist_m: None,
        })
    }

    /// Regenerate the trajectory if a new plan has arrived or the vehicle has moved far enough
    /// since the last generation.
    ///
    /// Outputs the new trajectory when one is generated this cycle. If the plan contains
    /// maneuvers which cannot be expressed as a trajectory the plan is dropped and the error
    /// returned.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut forced = false;
        if let Some(plan) = &input_data.new_plan {
            debug!("New plan of {} maneuvers", plan.mnvrs.len());
            self.mnvrs = Some(plan.mnvrs.clone());
            forced = true;
        }

        let road_model = match &self.road_model {
            Some(r) => r,
            None => return Ok((None, self.report(TrajGenStatus::NoRoadModel))),
        };
        let mnvrs = match &self.mnvrs {
            Some(m) => m,
            None => return Ok((None, self.report(TrajGenStatus::NoPlan))),
        };

        let downtrack_m = input_data.snapshot.distance_from_route_start();
        let due = forced
            || match self.last_gen_dist_m {
                Some(d) => downtrack_m - d >= self.params.regen_downtrack_threshold_m,
                None => true,
            };

        if !due {
            return Ok((None, self.report(TrajGenStatus::Unchanged)));
        }

        let result = generate_trajectory(
            mnvrs,
            road_model.as_ref(),
            &input_data.snapshot.vehicle,
            &self.params,
        );

        match result {
            Ok(Some(traj)) => {
                info!(
                    "Trajectory of {} points generated at {:.2} m",
                    traj.points.len(),
                    downtrack_m
                );
                self.last_gen_dist_m = Some(downtrack_m);
                self.trajectory = Some(traj.clone());
                Ok((Some(traj), self.report(TrajGenStatus::Generated)))
            }
            Ok(None) => {
                self.last_gen_dist_m = Some(downtrack_m);
                Ok((None, self.report(TrajGenStatus::FitUnavailable)))
            }
            Err(e) => {
                self.mnvrs = None;
                self.last_gen_dist_m = None;
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
