//! # Front vehicle search
//!
//! Finds the closest obstacle ahead of the host vehicle in its own lane.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::RoadwayObstacle;
use ordered_float::OrderedFloat;

use super::{FrontVehicle, Params, VehicleState};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the front vehicle among the given obstacles.
///
/// The longitudinal offset of an obstacle is measured from the front of the host vehicle to the
/// rear of the obstacle. Only obstacles in the host lane with a strictly positive offset are
/// candidates, of which the one with the smallest offset is returned. Ties go to the obstacle
/// which appears first in the list.
pub fn find_front_vehicle(
    obstacles: &[RoadwayObstacle],
    vehicle: &VehicleState,
    params: &Params,
) -> Option<FrontVehicle> {
    obstacles
        .iter()
        .filter(|obs| in_lane(obs, vehicle.lane_index, params.check_secondary_lanes))
        .map(|obs| (obs, longitudinal_offset_m(obs, vehicle, params)))
        .filter(|(_, offset_m)| *offset_m > 0.0)
        .min_by_key(|(_, offset_m)| OrderedFloat(*offset_m))
        .map(|(obs, offset_m)| FrontVehicle {
            distance_m: offset_m,
            // Obstacle velocity is relative to the host, convert to ground speed
            speed_ms: vehicle.speed_ms + obs.object.velocity_ms[0],
        })
}

/// Longitudinal offset between the host vehicle's front and the obstacle's rear.
///
/// The object size is given as half extents so `size_m[0]` is the half length.
fn longitudinal_offset_m(obs: &RoadwayObstacle, vehicle: &VehicleState, params: &Params) -> f64 {
    0.5 * params.vehicle_length_m + obs.downtrack_m - obs.object.size_m[0] - vehicle.downtrack_m
}

fn in_lane(obs: &RoadwayObstacle, lane_index: i32, check_secondary: bool) -> bool {
    obs.primary_lane == lane_index
        || (check_secondary && obs.secondary_lanes.contains(&lane_index))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::ExternalObject;

    /// Build an obstacle whose offset from a host at downtrack zero with a 3 m long vehicle is
    /// `offset_m`.
    fn obstacle(offset_m: f64, lane: i32, rel_speed_ms: f64) -> RoadwayObstacle {
        let half_length_m = 2.0;
        RoadwayObstacle {
            downtrack_m: offset_m - 1.5 + half_length_m,
            primary_lane: lane,
            secondary_lanes: vec![],
            object: ExternalObject {
                position_m: [offset_m, 0.0, 0.0],
                size_m: [half_length_m, 1.0, 1.0],
                velocity_ms: [rel_speed_ms, 0.0, 0.0],
            },
        }
    }

    fn host(speed_ms: f64) -> VehicleState {
        VehicleState {
            speed_ms,
            lane_index: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_out_of_lane_obstacle_ignored() {
        let obstacles = vec![obstacle(2.0, 2, 0.0), obstacle(10.0, 1, 0.0)];

        let fv = find_front_vehicle(&obstacles, &host(10.0), &Params::default()).unwrap();

        assert!((fv.distance_m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_closest_ahead_selected() {
        let obstacles = vec![
            obstacle(25.0, 1, 0.0),
            obstacle(-4.0, 1, 0.0),
            obstacle(12.0, 1, -3.0),
            obstacle(40.0, 1, 0.0),
        ];

        let fv = find_front_vehicle(&obstacles, &host(10.0), &Params::default()).unwrap();

        assert!((fv.distance_m - 12.0).abs() < 1e-9);
        assert!((fv.speed_ms - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_independent() {
        let mut obstacles = vec![
            obstacle(25.0, 1, 1.0),
            obstacle(12.0, 1, -3.0),
            obstacle(40.0, 1, 2.0),
        ];
        let params = Params::default();

        let fwd = find_front_vehicle(&obstacles, &host(10.0), &params);
        obstacles.reverse();
        let rev = find_front_vehicle(&obstacles, &host(10.0), &params);

        assert_eq!(fwd, rev);
    }

    #[test]
    fn test_tie_goes_to_first_found() {
        let obstacles = vec![obstacle(10.0, 1, -1.0), obstacle(10.0, 1, -2.0)];

        let fv = find_front_vehicle(&obstacles, &host(10.0), &Params::default()).unwrap();

        assert!((fv.speed_ms - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_offset_is_not_ahead() {
        let obstacles = vec![obstacle(0.0, 1, 0.0)];

        assert!(find_front_vehicle(&obstacles, &host(10.0), &Params::default()).is_none());
        assert!(find_front_vehicle(&[], &host(10.0), &Params::default()).is_none());
    }

    #[test]
    fn test_secondary_lanes() {
        let mut obs = obstacle(15.0, 2, 0.0);
        obs.secondary_lanes = vec![1];
        let obstacles = vec![obs];

        let mut params = Params::default();
        assert!(find_front_vehicle(&obstacles, &host(10.0), &params).is_none());

        params.check_secondary_lanes = true;
        assert!(find_front_vehicle(&obstacles, &host(10.0), &params).is_some());
    }
}
