//! # Route points
//!
//! Functions turning maneuvers into speed-annotated route points and thinning them down for
//! fitting.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use comms_if::mnvr::Mnvr as MnvrMsg;
use nalgebra::Point2;

use super::{
    road_model::{concatenate_lanelets, Lanelet, RoadModel, POINT_EPSILON_M},
    TrajGenError,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point along the route with the speed the vehicle should have there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSpeedPair {
    /// Units: meters
    pub point: Point2<f64>,

    /// Units: meters/second
    pub speed_ms: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a sequence of maneuvers into route points.
///
/// Every point of the lanelets covered by a maneuver is paired with that maneuver's end speed.
/// A lanelet covered by more than one maneuver is only emitted for the first of them. Only lane
/// following maneuvers are supported, any other kind rejects the whole sequence.
pub fn mnvrs_to_points(
    mnvrs: &[MnvrMsg],
    road_model: &dyn RoadModel,
) -> Result<Vec<PointSpeedPair>, TrajGenError> {
    let mut lane_following = Vec::with_capacity(mnvrs.len());
    for (index, mnvr) in mnvrs.iter().enumerate() {
        match mnvr {
            MnvrMsg::LaneFollowing(lf) => lane_following.push(lf),
            other => {
                return Err(TrajGenError::UnsupportedMnvrType {
                    index,
                    kind: other.kind(),
                })
            }
        }
    }

    let mut emitted_ids = HashSet::new();
    let mut points: Vec<PointSpeedPair> = Vec::new();

    for lf in lane_following {
        let lanelets: Vec<Lanelet> = road_model
            .lanelets_between(lf.start_dist_m, lf.end_dist_m, true)?
            .into_iter()
            .filter(|l| emitted_ids.insert(l.id))
            .collect();

        for point in concatenate_lanelets(&lanelets) {
            if let Some(last) = points.last() {
                if (point - last.point).norm() < POINT_EPSILON_M {
                    continue;
                }
            }
            points.push(PointSpeedPair {
                point,
                speed_ms: lf.end_speed_ms,
            });
        }
    }

    Ok(points)
}

/// Keep every `n`-th element starting from the first.
///
/// For `L` elements `ceil(L / n)` are returned. A stride of zero is an error.
pub fn downsample_points<T: Clone>(points: &[T], n: usize) -> Result<Vec<T>, TrajGenError> {
    if n == 0 {
        return Err(TrajGenError::InvalidDownsampleStride);
    }

    Ok(points.iter().step_by(n).cloned().collect())
}

/// Index of the point closest to `position`, or `None` if there are no points.
///
/// If several points are equally close the first is returned.
pub fn nearest_point_index(points: &[PointSpeedPair], position: &Point2<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, p) in points.iter().enumerate() {
        let dist_sq = (p.point - position).norm_squared();
        match best {
            Some((_, best_dist_sq)) if best_dist_sq <= dist_sq => (),
            _ => best = Some((i, dist_sq)),
        }
    }

    best.map(|(i, _)| i)
}

/// Split pairs into their points and speeds.
pub fn split_point_speed_pairs(pairs: &[PointSpeedPair]) -> (Vec<Point2<f64>>, Vec<f64>) {
    pairs.iter().map(|p| (p.point, p.speed_ms)).unzip()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
