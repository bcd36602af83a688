//! # Road model
//!
//! The road is described as a sequence of lanelets, each with a centreline polyline. Consecutive
//! lanelets share their join point, the last point of one lanelet being the first point of the
//! next.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Point2;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Points closer than this are considered the same point.
///
/// Units: meters
pub const POINT_EPSILON_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A lanelet along the route.
#[derive(Debug, Clone, PartialEq)]
pub struct Lanelet {
    pub id: u64,

    /// Centreline points, in order of travel.
    ///
    /// Units: meters
    pub centerline_m: Vec<Point2<f64>>,
}

/// A road model made of a single chain of lanelets following the route.
#[derive(Debug, Clone)]
pub struct PolylineRoadModel {
    lanelets: Vec<Lanelet>,

    /// Downtrack distance of the start of each lanelet, plus a final entry for the end of the
    /// route.
    boundaries_m: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RoadModelError {
    #[error("The road model contains no lanelets")]
    NoLanelets,

    #[error("Invalid downtrack range {start_m} m to {end_m} m")]
    InvalidRange { start_m: f64, end_m: f64 },
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of road geometry.
pub trait RoadModel: Send {
    /// Get the lanelets covering the downtrack range `start_m` to `end_m`, in order of travel.
    ///
    /// If `route_following` is set only lanelets on the route are returned.
    fn lanelets_between(
        &self,
        start_m: f64,
        end_m: f64,
        route_following: bool,
    ) -> Result<Vec<Lanelet>, RoadModelError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lanelet {
    /// Length of the centreline.
    pub fn length_m(&self) -> f64 {
        self.centerline_m
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }
}

impl PolylineRoadModel {
    pub fn new(lanelets: Vec<Lanelet>) -> Result<Self, RoadModelError> {
        if lanelets.is_empty() {
            return Err(RoadModelError::NoLanelets);
        }

        let mut boundaries_m = Vec::with_capacity(lanelets.len() + 1);
        let mut dist_m = 0.0;
        boundaries_m.push(dist_m);
        for lanelet in lanelets.iter() {
            dist_m += lanelet.length_m();
            boundaries_m.push(dist_m);
        }

        debug!(
            "Road model built from {} lanelets, {:.2} m long",
            lanelets.len(),
            dist_m
        );

        Ok(Self {
            lanelets,
            boundaries_m,
        })
    }

    /// Split a route centreline into lanelets of `points_per_lanelet` points.
    ///
    /// Neighbouring lanelets share their join point.
    pub fn from_centerline(
        points: &[Point2<f64>],
        points_per_lanelet: usize,
    ) -> Result<Self, RoadModelError> {
        if points.len() < 2 {
            return Err(RoadModelError::NoLanelets);
        }

        let step = points_per_lanelet.max(2) - 1;
        let mut lanelets = Vec::new();
        let mut start = 0;

        while start < points.len() - 1 {
            let end = (start + step).min(points.len() - 1);
            lanelets.push(Lanelet {
                id: lanelets.len() as u64,
                centerline_m: points[start..=end].to_vec(),
            });
            start = end;
        }

        Self::new(lanelets)
    }

    pub fn length_m(&self) -> f64 {
        self.boundaries_m.last().copied().unwrap_or(0.0)
    }

    pub fn lanelets(&self) -> &[Lanelet] {
        &self.lanelets
    }
}

impl RoadModel for PolylineRoadModel {
    /// Every lanelet in this model is on the route, so `route_following` has no effect.
    fn lanelets_between(
        &self,
        start_m: f64,
        end_m: f64,
        _route_following: bool,
    ) -> Result<Vec<Lanelet>, RoadModelError> {
        if !(end_m > start_m) {
            return Err(RoadModelError::InvalidRange { start_m, end_m });
        }

        Ok(self
            .lanelets
            .iter()
            .zip(self.boundaries_m.windows(2))
            .filter(|(_, b)| b[0] < end_m && b[1] > start_m)
            .map(|(l, _)| l.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Join the centrelines of consecutive lanelets into a single polyline.
///
/// A point shared between the end of one lanelet and the start of the next is kept once.
pub fn concatenate_lanelets(lanelets: &[Lanelet]) -> Vec<Point2<f64>> {
    let mut points: Vec<Point2<f64>> = Vec::new();

    for lanelet in lanelets {
        let mut iter = lanelet.centerline_m.iter().peekable();

        if let (Some(last), Some(first)) = (points.last(), iter.peek()) {
            if (*first - last).norm() < POINT_EPSILON_M {
                iter.next();
            }
        }

        points.extend(iter);
    }

    points
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
