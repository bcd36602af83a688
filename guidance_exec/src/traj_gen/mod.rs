//! # Trajectory Generation
//!
//! Turns a maneuver plan and the road geometry into a trajectory: a sequence of points along the
//! route, each with a target speed, heading and curvature.
//!
//! Generation runs as a pipeline:
//!
//! 1. Maneuvers are expanded into speed-annotated route points ([`mnvrs_to_points`]).
//! 2. The points are thinned out by the downsample stride ([`downsample_points`]).
//! 3. Points behind the vehicle are dropped, keeping from the nearest point onwards
//!    ([`nearest_point_index`]).
//! 4. A smooth curve is fitted through the remaining points ([`compute_fit`]).
//! 5. The heading and curvature of the curve are evaluated at each point.
//!
//! If fewer than three distinct points remain no curve can be fitted, which is not an error: the
//! [`TrajGen`] module keeps its previous trajectory instead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod fit;
mod geometry;
mod params;
mod points;
mod road_model;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use fit::{compute_fit, CubicSpline, FitError, FittedCurve, MIN_FIT_POINTS};
pub use geometry::{compute_curvature_from_fit, compute_orientation_from_fit};
pub use params::Params;
pub use points::{
    downsample_points, mnvrs_to_points, nearest_point_index, split_point_speed_pairs,
    PointSpeedPair,
};
pub use road_model::{concatenate_lanelets, Lanelet, PolylineRoadModel, RoadModel, RoadModelError};
pub use state::{InputData, StatusReport, TrajGen, TrajGenStatus};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    cmd::{TrajPoint, Trajectory},
    mnvr::Mnvr as MnvrMsg,
};
use log::trace;
use nalgebra::Point2;
use thiserror::Error;

use crate::mnvr_inputs::VehicleState;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during trajectory generation.
#[derive(Debug, Error, PartialEq)]
pub enum TrajGenError {
    #[error("Maneuver {index} is a {kind} maneuver, only lane following is supported")]
    UnsupportedMnvrType { index: usize, kind: &'static str },

    #[error("The downsample stride must be at least 1")]
    InvalidDownsampleStride,

    #[error("Road model error: {0}")]
    RoadModelError(#[from] RoadModelError),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a trajectory for the maneuvers starting from the vehicle's current position.
///
/// Returns `Ok(None)` if no curve could be fitted through the route points.
pub fn generate_trajectory(
    mnvrs: &[MnvrMsg],
    road_model: &dyn RoadModel,
    vehicle: &VehicleState,
    params: &Params,
) -> Result<Option<Trajectory>, TrajGenError> {
    let route_points = mnvrs_to_points(mnvrs, road_model)?;
    let mut points = downsample_points(&route_points, params.downsample_stride)?;

    // The stride can land two maneuvers' points on the same spot
    points.dedup_by(|b, a| (b.point - a.point).norm() < road_model::POINT_EPSILON_M);

    let nearest = match nearest_point_index(&points, &Point2::new(vehicle.x_m, vehicle.y_m)) {
        Some(i) => i,
        None => return Ok(None),
    };
    let points = &points[nearest..];

    trace!(
        "Generating trajectory from {} route points, {} after downsampling and trimming",
        route_points.len(),
        points.len()
    );

    let (positions, speeds) = split_point_speed_pairs(points);

    let fit = match compute_fit(&positions) {
        Some(f) => f,
        None => return Ok(None),
    };

    trace!("Fitted curve of {:.2} m", fit.length_m());

    let yaws = compute_orientation_from_fit(&fit);
    let curvatures = compute_curvature_from_fit(&fit, params.max_curvature_m);

    let traj_points = fit
        .knots()
        .iter()
        .zip(speeds.iter())
        .zip(yaws.iter().zip(curvatures.iter()))
        .map(|((s, speed_ms), (yaw_rad, curv_m))| {
            let position = fit.position(*s);
            TrajPoint {
                x_m: position.x,
                y_m: position.y,
                offset_m: *s,
                speed_ms: *speed_ms,
                yaw_rad: *yaw_rad,
                curv_m: *curv_m,
            }
        })
        .collect();

    Ok(Some(Trajectory {
        generated_at_dist_m: vehicle.downtrack_m,
        points: traj_points,
    }))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::mnvr::LaneFollowingMnvr;

    /// A straight 50 m lane along the x axis with points every meter.
    fn straight_road() -> PolylineRoadModel {
        let points: Vec<_> = (0..=50).map(|i| Point2::new(i as f64, 0.0)).collect();
        PolylineRoadModel::from_centerline(&points, 10).unwrap()
    }

    fn lane_following(start_m: f64, end_m: f64, end_speed_ms: f64) -> MnvrMsg {
        MnvrMsg::LaneFollowing(LaneFollowingMnvr {
            start_dist_m: start_m,
            end_dist_m: end_m,
            start_speed_ms: 0.0,
            end_speed_ms,
        })
    }

    #[test]
    fn test_straight_lane() {
        let params = Params {
            downsample_stride: 5,
            ..Default::default()
        };

        let traj = generate_trajectory(
            &[lane_following(0.0, 50.0, 10.0)],
            &straight_road(),
            &VehicleState::default(),
            &params,
        )
        .unwrap()
        .unwrap();

        // 51 points with a stride of 5
        assert_eq!(traj.points.len(), 11);
        for p in traj.points.iter() {
            assert!(p.yaw_rad.abs() < 1e-9);
            assert_eq!(p.curv_m, 0.0);
            assert_eq!(p.speed_ms, 10.0);
            assert!(p.y_m.abs() < 1e-9);
        }
        assert!(traj
            .points
            .windows(2)
            .all(|w| w[1].x_m > w[0].x_m && w[1].offset_m > w[0].offset_m));
        assert!((traj.points[10].offset_m - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_trimmed_to_vehicle() {
        let params = Params {
            downsample_stride: 5,
            ..Default::default()
        };
        let vehicle = VehicleState {
            x_m: 21.0,
            y_m: 0.5,
            downtrack_m: 21.0,
            ..Default::default()
        };

        let traj = generate_trajectory(
            &[lane_following(0.0, 50.0, 10.0)],
            &straight_road(),
            &vehicle,
            &params,
        )
        .unwrap()
        .unwrap();

        assert!((traj.points[0].x_m - 20.0).abs() < 1e-9);
        assert_eq!(traj.points.len(), 7);
        assert_eq!(traj.generated_at_dist_m, 21.0);
    }

    #[test]
    fn test_no_fit_near_end() {
        let params = Params {
            downsample_stride: 10,
            ..Default::default()
        };
        let vehicle = VehicleState {
            x_m: 48.0,
            ..Default::default()
        };

        // Only the point at 50 m remains after trimming
        let result = generate_trajectory(
            &[lane_following(0.0, 50.0, 10.0)],
            &straight_road(),
            &vehicle,
            &params,
        );

        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_errors() {
        let params = Params {
            downsample_stride: 0,
            ..Default::default()
        };

        assert_eq!(
            generate_trajectory(
                &[lane_following(0.0, 50.0, 10.0)],
                &straight_road(),
                &VehicleState::default(),
                &params,
            ),
            Err(TrajGenError::InvalidDownsampleStride)
        );

        assert!(matches!(
            generate_trajectory(
                &[lane_following(30.0, 10.0, 10.0)],
                &straight_road(),
                &VehicleState::default(),
                &Params::default(),
            ),
            Err(TrajGenError::RoadModelError(_))
        ));
    }
}
