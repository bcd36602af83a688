//! # Maneuver Inputs
//!
//! Aggregates the latest kinematic state of the host vehicle along with the front vehicle
//! derived from the roadway environment. Updates arrive through the `on_*` functions, which are
//! called by the message processor, while maneuvers read a consistent snapshot of the state
//! through [`MnvrInputs::snapshot`].
//!
//! Every update builds a complete new [`InputsSnapshot`] and publishes it by swapping an `Arc`,
//! so a reader never sees a speed from one update mixed with a front vehicle from another.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod front_vehicle;
mod params;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use front_vehicle::find_front_vehicle;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, RwLock};

use comms_if::msg::{RoadwayEnvironment, RouteState, Velocity, VehiclePose};
use log::{debug, trace};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance reported when there is no vehicle ahead in the host lane.
pub const NO_FRONT_VEHICLE_DISTANCE_M: f64 = f64::INFINITY;

/// Speed reported when there is no vehicle ahead in the host lane.
pub const NO_FRONT_VEHICLE_SPEED_MS: f64 = f64::INFINITY;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic state of the host vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleState {
    /// Distance travelled along the route.
    ///
    /// Units: meters
    pub downtrack_m: f64,

    /// Longitudinal speed, never negative.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Index of the lane the vehicle is currently in
    pub lane_index: i32,

    /// Global position of the vehicle.
    ///
    /// Units: meters
    pub x_m: f64,
    pub y_m: f64,

    /// Global heading of the vehicle.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// The closest vehicle ahead of the host in the host lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontVehicle {
    /// Distance from the front of the host to the rear of the front vehicle.
    ///
    /// Units: meters
    pub distance_m: f64,

    /// Absolute speed of the front vehicle.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}

/// An immutable view of all maneuver inputs at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputsSnapshot {
    pub vehicle: VehicleState,

    /// The front vehicle, or `None` if nothing is ahead in the host lane.
    pub front_vehicle: Option<FrontVehicle>,

    /// Time between a command being issued and the vehicle responding to it.
    ///
    /// Units: seconds
    pub response_lag_s: f64,
}

/// Maneuver inputs aggregator.
///
/// Holds the parameters used to derive the front vehicle and the latest published snapshot.
#[derive(Debug)]
pub struct MnvrInputs {
    params: Params,

    current: RwLock<Arc<InputsSnapshot>>,

    /// The last obstacle list received, kept so the front vehicle can be recomputed when the host
    /// state changes.
    obstacles: RwLock<RoadwayEnvironment>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputsSnapshot {
    pub fn distance_from_route_start(&self) -> f64 {
        self.vehicle.downtrack_m
    }

    pub fn current_speed(&self) -> f64 {
        self.vehicle.speed_ms
    }

    pub fn current_lane(&self) -> i32 {
        self.vehicle.lane_index
    }

    pub fn response_lag(&self) -> f64 {
        self.response_lag_s
    }

    /// Distance to the front vehicle, or [`NO_FRONT_VEHICLE_DISTANCE_M`] if there is none.
    pub fn distance_to_front_vehicle(&self) -> f64 {
        self.front_vehicle
            .map(|f| f.distance_m)
            .unwrap_or(NO_FRONT_VEHICLE_DISTANCE_M)
    }

    /// Speed of the front vehicle, or [`NO_FRONT_VEHICLE_SPEED_MS`] if there is none.
    pub fn front_vehicle_speed(&self) -> f64 {
        self.front_vehicle
            .map(|f| f.speed_ms)
            .unwrap_or(NO_FRONT_VEHICLE_SPEED_MS)
    }
}

impl MnvrInputs {
    /// Create a new aggregator with all values at zero and no front vehicle.
    pub fn new(params: Params) -> Self {
        let initial = Self::initial_snapshot(&params);

        Self {
            params,
            current: RwLock::new(Arc::new(initial)),
            obstacles: RwLock::new(RoadwayEnvironment::default()),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the latest published snapshot.
    pub fn snapshot(&self) -> Arc<InputsSnapshot> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Update the route position and lane of the host vehicle.
    pub fn on_route_state(&self, route_state: &RouteState) {
        trace!(
            "Route state: downtrack {:.2} m, lane {}",
            route_state.downtrack_m,
            route_state.lane_index
        );

        self.publish(|snapshot| {
            snapshot.vehicle.downtrack_m = route_state.downtrack_m;
            snapshot.vehicle.lane_index = route_state.lane_index;
        });
    }

    /// Update the speed of the host vehicle.
    ///
    /// Negative speeds are reported as zero.
    pub fn on_velocity(&self, velocity: &Velocity) {
        self.publish(|snapshot| {
            snapshot.vehicle.speed_ms = velocity.linear_x_ms.max(0.0);
        });
    }

    /// Update the global pose of the host vehicle.
    pub fn on_pose(&self, pose: &VehiclePose) {
        self.publish(|snapshot| {
            snapshot.vehicle.x_m = pose.x_m;
            snapshot.vehicle.y_m = pose.y_m;
            snapshot.vehicle.heading_rad = pose.heading_rad;
        });
    }

    /// Replace the obstacle list and recompute the front vehicle.
    pub fn on_roadway_environment(&self, env: &RoadwayEnvironment) {
        match self.obstacles.write() {
            Ok(mut guard) => *guard = env.clone(),
            Err(poisoned) => *poisoned.into_inner() = env.clone(),
        }

        self.publish(|_| {});
    }

    /// Revert every value to its initial state, used when the session restarts.
    pub fn reset(&self) {
        debug!("Resetting maneuver inputs");

        match self.obstacles.write() {
            Ok(mut guard) => *guard = RoadwayEnvironment::default(),
            Err(poisoned) => *poisoned.into_inner() = RoadwayEnvironment::default(),
        }

        let initial = Arc::new(Self::initial_snapshot(&self.params));
        match self.current.write() {
            Ok(mut guard) => *guard = initial,
            Err(poisoned) => *poisoned.into_inner() = initial,
        }
    }

    fn initial_snapshot(params: &Params) -> InputsSnapshot {
        InputsSnapshot {
            response_lag_s: params.vehicle_response_lag_s,
            ..Default::default()
        }
    }

    /// Build a new snapshot from the current one, apply `update` to it, recompute the front
    /// vehicle and publish the result.
    fn publish<F>(&self, update: F)
    where
        F: FnOnce(&mut InputsSnapshot),
    {
        let mut guard = match self.current.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut next = InputsSnapshot::clone(&guard);
        update(&mut next);

        next.front_vehicle = match self.obstacles.read() {
            Ok(env) => find_front_vehicle(&env.obstacles, &next.vehicle, &self.params),
            Err(poisoned) => {
                find_front_vehicle(&poisoned.into_inner().obstacles, &next.vehicle, &self.params)
            }
        };

        *guard = Arc::new(next);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::{ExternalObject, RoadwayObstacle};

    fn env_with_obstacle_at(downtrack_m: f64, lane: i32) -> RoadwayEnvironment {
        RoadwayEnvironment {
            obstacles: vec![RoadwayObstacle {
                downtrack_m,
                primary_lane: lane,
                secondary_lanes: vec![],
                object: ExternalObject {
                    position_m: [0.0; 3],
                    size_m: [2.0, 1.0, 1.0],
                    velocity_ms: [-2.0, 0.0, 0.0],
                },
            }],
        }
    }

    #[test]
    fn test_initial_state() {
        let inputs = MnvrInputs::new(Params::default());
        let snap = inputs.snapshot();

        assert_eq!(snap.distance_from_route_start(), 0.0);
        assert_eq!(snap.current_speed(), 0.0);
        assert_eq!(snap.response_lag(), 1.4);
        assert_eq!(snap.distance_to_front_vehicle(), NO_FRONT_VEHICLE_DISTANCE_M);
        assert_eq!(snap.front_vehicle_speed(), NO_FRONT_VEHICLE_SPEED_MS);
    }

    #[test]
    fn test_updates_publish_new_snapshot() {
        let inputs = MnvrInputs::new(Params::default());
        let before = inputs.snapshot();

        inputs.on_velocity(&Velocity { linear_x_ms: 10.0 });
        inputs.on_route_state(&RouteState {
            downtrack_m: 20.0,
            lane_index: 1,
        });

        // Old snapshot is untouched
        assert_eq!(before.current_speed(), 0.0);

        let after = inputs.snapshot();
        assert_eq!(after.current_speed(), 10.0);
        assert_eq!(after.distance_from_route_start(), 20.0);
        assert_eq!(after.current_lane(), 1);
    }

    #[test]
    fn test_negative_speed_clamped() {
        let inputs = MnvrInputs::new(Params::default());
        inputs.on_velocity(&Velocity { linear_x_ms: -1.0 });
        assert_eq!(inputs.snapshot().current_speed(), 0.0);
    }

    #[test]
    fn test_front_vehicle_follows_host_state() {
        let inputs = MnvrInputs::new(Params::default());
        inputs.on_velocity(&Velocity { linear_x_ms: 10.0 });
        inputs.on_route_state(&RouteState {
            downtrack_m: 0.0,
            lane_index: 1,
        });
        inputs.on_roadway_environment(&env_with_obstacle_at(20.0, 1));

        // 1.5 + 20 - 2 - 0
        let snap = inputs.snapshot();
        assert!((snap.distance_to_front_vehicle() - 19.5).abs() < 1e-9);
        assert!((snap.front_vehicle_speed() - 8.0).abs() < 1e-9);

        // Moving past the obstacle removes it
        inputs.on_route_state(&RouteState {
            downtrack_m: 30.0,
            lane_index: 1,
        });
        assert!(inputs.snapshot().front_vehicle.is_none());
    }

    #[test]
    fn test_reset() {
        let inputs = MnvrInputs::new(Params::default());
        inputs.on_velocity(&Velocity { linear_x_ms: 10.0 });
        inputs.on_roadway_environment(&env_with_obstacle_at(20.0, 0));
        assert!(inputs.snapshot().front_vehicle.is_some());

        inputs.reset();

        let snap = inputs.snapshot();
        assert_eq!(snap.current_speed(), 0.0);
        assert!(snap.front_vehicle.is_none());

        // The obstacle list is cleared too
        inputs.on_velocity(&Velocity { linear_x_ms: 5.0 });
        assert!(inputs.snapshot().front_vehicle.is_none());
    }
}
