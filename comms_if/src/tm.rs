//! # Telemetry records

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use crate::tc::PoseSpec;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Physical state of the simulated robot at one tick.
///
/// The record is flat so that it can be archived as a single CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTm {
    /// Simulated time since the start of the simulation
    pub time_s: f64,

    pub x_m: f64,
    pub y_m: f64,
    pub theta_rad: f64,

    /// Commanded linear speed
    pub speed_ms: f64,

    /// Commanded angular rate
    pub turn_rate_rads: f64,

    pub left_wheel_rad: f64,
    pub right_wheel_rad: f64,
    pub left_wheel_rads: f64,
    pub right_wheel_rads: f64,

    pub lift_rad: f64,
    pub lift_target_rad: f64,

    /// Index of the waypoint being driven to, if following a sequence
    pub waypoint_idx: Option<usize>,

    /// True if there is no active goal or the active goal has been reached
    pub ctrl_finished: bool
}

/// Result of a planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTm {
    /// Name of the planner which produced the path
    pub planner: String,

    pub start: (usize, usize),
    pub goal: (usize, usize),

    /// Cells from start to goal inclusive, empty if the goal is unreachable
    pub path: Vec<(usize, usize)>,

    /// Waypoints for the cell centres along the path
    pub waypoints: Vec<PoseSpec>,

    /// Number of previously removed walls restored to find the path
    pub num_restored_walls: usize
}
