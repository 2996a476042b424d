//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications 
//! interface. Telecommands are JSON objects with a `"type"` member naming the
//! command and, for commands which carry data, a `"payload"` object:
//!
//! ```json
//! {"type": "Goto", "payload": {"x_m": 0.0, "y_m": 1.2, "theta_rad": 1.5708}}
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod nav;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json::{self, Value};
use structopt::StructOpt;
use thiserror::Error;

// Internal
pub use nav::PoseSpec;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the simulator by an operator or
/// a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Follow the session's tour waypoints from the first one.
    #[structopt(name = "follow")]
    StartFollow,

    /// Drive to a single pose.
    #[structopt(name = "goto")]
    Goto {
        x_m: f64,
        y_m: f64,
        theta_rad: f64
    },

    /// Drive to the configured default pose.
    #[structopt(name = "goto-default")]
    GotoDefault,

    /// Follow the given waypoints in order.
    #[structopt(name = "waypoints")]
    FollowWaypoints {
        /// Waypoints formatted as `x_m,y_m,theta_rad`
        waypoints: Vec<PoseSpec>
    },

    /// Plan a route across the map to the given cell and follow it, finishing
    /// with the given heading.
    #[structopt(name = "goto-cell")]
    GotoCell {
        cell_x: usize,
        cell_y: usize,
        theta_rad: f64
    },

    /// Raise the lift over the given duration.
    #[structopt(name = "raise")]
    LiftRaise {
        duration_s: f64
    },

    /// Lower the lift over the given duration.
    #[structopt(name = "lower")]
    LiftLower {
        duration_s: f64
    },

    /// Move the lift to an arbitrary angle over the given duration.
    #[structopt(name = "lift")]
    LiftSet {
        angle_deg: f64,
        duration_s: f64
    },

    /// Open-loop manual command, overriding any active controller while it
    /// lasts.
    #[structopt(name = "nudge")]
    Nudge {
        speed_ms: f64,
        turn_rate_rads: f64,
        duration_s: f64
    },

    /// Discard the active controller and any nudge, stopping the robot.
    #[structopt(name = "stop")]
    Stop,

    /// Place a wall next to the given cell, on the side nearest the heading.
    #[structopt(name = "add-obst")]
    AddObstacle {
        cell_x: usize,
        cell_y: usize,
        theta_rad: f64
    },

    /// Remove the wall next to the given cell, on the side nearest the
    /// heading.
    #[structopt(name = "rm-obst")]
    RemoveObstacle {
        cell_x: usize,
        cell_y: usize,
        theta_rad: f64
    },

    /// Place a wall in front of the robot's current cell.
    #[structopt(name = "obst-ahead")]
    ObstacleAhead
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} has an invalid payload: {1}")]
    InvalidPayload(String, serde_json::Error)
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Names of all TC types, as they appear in the `"type"` member.
pub const TC_TYPES: [&str; 13] = [
    "StartFollow",
    "Goto",
    "GotoDefault",
    "FollowWaypoints",
    "GotoCell",
    "LiftRaise",
    "LiftLower",
    "LiftSet",
    "Nudge",
    "Stop",
    "AddObstacle",
    "RemoveObstacle",
    "ObstacleAhead"
];

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(TcParseError::InvalidJson(e))
        };

        // Check the type first so that an unknown command is reported as such
        // rather than as a generic deserialisation error
        let tc_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => return Err(TcParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        };

        if !TC_TYPES.contains(&tc_type.as_str()) {
            return Err(TcParseError::InvalidType(
                format!("{} is not a recognised TC type", tc_type)
            ))
        }

        serde_json::from_value(val)
            .map_err(|e| TcParseError::InvalidPayload(tc_type, e))
    }

    /// Serialise the TC into a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(
            Tc::from_json("{\"type\": \"StartFollow\"}").unwrap(),
            Tc::StartFollow
        );
        assert_eq!(
            Tc::from_json(
                "{\"type\": \"Goto\", \"payload\": \
                {\"x_m\": 0.0, \"y_m\": 1.2, \"theta_rad\": 1.5}}"
            ).unwrap(),
            Tc::Goto { x_m: 0.0, y_m: 1.2, theta_rad: 1.5 }
        );
        assert_eq!(
            Tc::from_json(
                "{\"type\": \"FollowWaypoints\", \"payload\": {\"waypoints\": \
                [{\"x_m\": 0.4, \"y_m\": 0.6, \"theta_rad\": 0.0}]}}"
            ).unwrap(),
            Tc::FollowWaypoints { waypoints: vec![PoseSpec::new(0.4, 0.6, 0.0)] }
        );
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            Tc::from_json("{\"type\": "),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json("{\"type\": 4}"),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json("{\"type\": \"Warp\"}"),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json("{\"type\": \"LiftSet\", \"payload\": {\"angle_deg\": 90.0}}"),
            Err(TcParseError::InvalidPayload(t, _)) if t == "LiftSet"
        ));
    }

    #[test]
    fn test_to_json() {
        let tc = Tc::Nudge { speed_ms: 0.1, turn_rate_rads: 0.0, duration_s: 1.0 };
        let json = tc.to_json().unwrap();
        assert_eq!(Tc::from_json(&json).unwrap(), tc);
    }
}
