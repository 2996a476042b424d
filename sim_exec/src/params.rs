//! # Simulator Executable Parameters
//!
//! This module provide parameters for the simulator executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use comms_if::tc::PoseSpec;
use crate::grid_map::PlannerKind;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimExecParams {

    /// Simulated time advanced by each cycle
    pub cycle_period_s: f64,

    /// If true each cycle is paced to last `cycle_period_s` of wall time,
    /// otherwise the simulation runs as fast as possible
    pub real_time: bool,

    /// Map description to load, relative to the software root. If not set no
    /// map is loaded and map commands are rejected.
    pub map_file: Option<String>,

    /// Simulated time after which the executable stops regardless of the
    /// script
    pub max_duration_s: f64,

    /// Planner used for `GotoCell` commands
    pub planner: PlannerKind,

    /// Waypoints followed on a `StartFollow` command, also used to derive the
    /// pose control gains
    pub tour: Vec<PoseSpec>,

    /// Pose driven to on a `GotoDefault` command
    pub default_goal: PoseSpec
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for SimExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.05,
            real_time: false,
            map_file: None,
            max_duration_s: 600.0,
            planner: PlannerKind::Greedy,
            tour: vec![
                PoseSpec::new(0.4, 0.6, FRAC_PI_2),
                PoseSpec::new(1.2, 0.8, FRAC_PI_4),
                PoseSpec::new(2.0, 1.0, -FRAC_PI_4),
                PoseSpec::new(1.4, -0.6, PI),
                PoseSpec::new(0.4, 0.6, FRAC_PI_2),
            ],
            default_goal: PoseSpec::new(0.0, 1.2, FRAC_PI_2)
        }
    }
}
