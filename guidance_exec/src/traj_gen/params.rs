//! Trajectory generation parameters

use serde::Deserialize;

/// Parameters for trajectory generation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Only every n-th route point is kept before fitting
    pub downsample_stride: usize,

    /// Upper limit on the curvature reported for any trajectory point.
    ///
    /// Units: 1/meters
    pub max_curvature_m: f64,

    /// Distance the vehicle must travel before the trajectory is regenerated.
    ///
    /// Units: meters
    pub regen_downtrack_threshold_m: f64,

    /// Centreline of the route as `[x, y]` points. If empty no trajectory is generated.
    ///
    /// Units: meters
    pub route_points_m: Vec<[f64; 2]>,

    /// Number of route points grouped into each lanelet
    pub points_per_lanelet: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            downsample_stride: 8,
            max_curvature_m: 100000.0,
            regen_downtrack_threshold_m: 5.0,
            route_points_m: Vec::new(),
            points_per_lanelet: 10,
        }
    }
}
