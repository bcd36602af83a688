//! # Message module
//!
//! Messages consumed by the guidance core. Each message is sent as a JSON packet with a `type`
//! string and a `payload` object, for example:
//!
//! ```json
//! {"type": "VELOCITY", "payload": {"linear_x_ms": 10.0}}
//! ```

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod roadway;
pub mod vehicle;

pub use roadway::*;
pub use vehicle::*;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

use crate::mnvr::MnvrPlan;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Message types.
///
/// The type identifies which update entry point of the guidance core the message must be
/// delivered to.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum MsgType {
    RouteState,
    Velocity,
    Pose,
    RoadwayEnvironment,
    MnvrPlan,
    Restart,
}

/// A parsed message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Msg {
    RouteState(RouteState),
    Velocity(Velocity),
    Pose(VehiclePose),
    RoadwayEnvironment(RoadwayEnvironment),
    MnvrPlan(MnvrPlan),
    Restart,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum MsgParseError {
    #[error("Message contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Message has an invalid type ({0})")]
    InvalidType(String),

    #[error("Message of type {0:?} is expected to have a payload but it doesn't")]
    MissingPayload(MsgType),

    #[error("Payload of message of type {0:?} is invalid: {1}")]
    InvalidPayload(MsgType, serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Msg {
    /// Parse a new message from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)?;

        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => {
                return Err(MsgParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        let msg_type = match MsgType::from_str(type_str) {
            Some(t) => t,
            None => {
                return Err(MsgParseError::InvalidType(format!(
                    "{} is not a recognised message type",
                    type_str
                )))
            }
        };

        if msg_type == MsgType::Restart {
            return Ok(Msg::Restart);
        }

        let payload = &val["payload"];
        if payload.is_null() {
            return Err(MsgParseError::MissingPayload(msg_type));
        }

        let parse_err = |e| MsgParseError::InvalidPayload(msg_type, e);

        Ok(match msg_type {
            MsgType::RouteState => {
                Msg::RouteState(serde_json::from_value(payload.clone()).map_err(parse_err)?)
            }
            MsgType::Velocity => {
                Msg::Velocity(serde_json::from_value(payload.clone()).map_err(parse_err)?)
            }
            MsgType::Pose => Msg::Pose(serde_json::from_value(payload.clone()).map_err(parse_err)?),
            MsgType::RoadwayEnvironment => Msg::RoadwayEnvironment(
                serde_json::from_value(payload.clone()).map_err(parse_err)?,
            ),
            MsgType::MnvrPlan => {
                Msg::MnvrPlan(serde_json::from_value(payload.clone()).map_err(parse_err)?)
            }
            MsgType::Restart => Msg::Restart,
        })
    }

    /// Get the type of this message
    pub fn msg_type(&self) -> MsgType {
        match self {
            Msg::RouteState(_) => MsgType::RouteState,
            Msg::Velocity(_) => MsgType::Velocity,
            Msg::Pose(_) => MsgType::Pose,
            Msg::RoadwayEnvironment(_) => MsgType::RoadwayEnvironment,
            Msg::MnvrPlan(_) => MsgType::MnvrPlan,
            Msg::Restart => MsgType::Restart,
        }
    }
}

impl MsgType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "ROUTE_STATE" => Some(MsgType::RouteState),
            "VELOCITY" => Some(MsgType::Velocity),
            "POSE" => Some(MsgType::Pose),
            "ROADWAY_ENVIRONMENT" => Some(MsgType::RoadwayEnvironment),
            "MNVR_PLAN" => Some(MsgType::MnvrPlan),
            "RESTART" => Some(MsgType::Restart),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::mnvr::Mnvr;

    #[test]
    fn test_parse_velocity() {
        let msg = Msg::from_json(r#"{"type": "VELOCITY", "payload": {"linear_x_ms": 12.5}}"#)
            .unwrap();

        assert_eq!(msg, Msg::Velocity(Velocity { linear_x_ms: 12.5 }));
    }

    #[test]
    fn test_parse_mnvr_plan() {
        let msg = Msg::from_json(
            r#"{"type": "MNVR_PLAN", "payload": {"mnvrs": [
                {"LaneFollowing": {
                    "start_dist_m": 0.0, "end_dist_m": 50.0,
                    "start_speed_ms": 5.0, "end_speed_ms": 10.0
                }}
            ]}}"#,
        )
        .unwrap();

        match msg {
            Msg::MnvrPlan(plan) => {
                assert_eq!(plan.mnvrs.len(), 1);
                assert_eq!(plan.mnvrs[0].kind(), "LaneFollowing");
                assert!(matches!(plan.mnvrs[0], Mnvr::LaneFollowing(_)));
                assert_eq!(plan.mnvrs[0].end_dist_m(), 50.0);
            }
            m => panic!("Expected a maneuver plan, got {:?}", m),
        }
    }

    #[test]
    fn test_parse_obstacle_without_secondary_lanes() {
        let msg = Msg::from_json(
            r#"{"type": "ROADWAY_ENVIRONMENT", "payload": {"obstacles": [{
                "downtrack_m": 30.0, "primary_lane": 1,
                "object": {
                    "position_m": [10.0, 0.0, 0.0],
                    "size_m": [2.0, 1.0, 1.0],
                    "velocity_ms": [-1.0, 0.0, 0.0]
                }
            }]}}"#,
        )
        .unwrap();

        match msg {
            Msg::RoadwayEnvironment(env) => {
                assert_eq!(env.obstacles.len(), 1);
                assert!(env.obstacles[0].secondary_lanes.is_empty());
            }
            m => panic!("Expected a roadway environment, got {:?}", m),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Msg::from_json("not json"),
            Err(MsgParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Msg::from_json(r#"{"type": "WARP_DRIVE"}"#),
            Err(MsgParseError::InvalidType(_))
        ));
        assert!(matches!(
            Msg::from_json(r#"{"type": "VELOCITY"}"#),
            Err(MsgParseError::MissingPayload(MsgType::Velocity))
        ));
        assert!(matches!(
            Msg::from_json(r#"{"type": "VELOCITY", "payload": {"speed": 1}}"#),
            Err(MsgParseError::InvalidPayload(MsgType::Velocity, _))
        ));
        assert_eq!(Msg::from_json(r#"{"type": "RESTART"}"#).unwrap(), Msg::Restart);
    }
}
