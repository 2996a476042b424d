//! # Data Store

use log::info;

use comms_if::tm::{PlanTm, SimTm};

use crate::{
    grid_map::{GridMap, PlannerKind},
    pose_ctrl::{PoseCtrl, VelocityCmd},
    robot::{Pose2, RobotState},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An open-loop manual command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    pub cmd: VelocityCmd,

    /// Simulated time left before the nudge ends
    pub remaining_s: f64,
}

/// Global data store for the simulator.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // Modules
    pub robot: RobotState,

    pub pose_ctrl: PoseCtrl,

    /// The map, if one was loaded
    pub map: Option<GridMap>,

    /// Planner used for map goals
    pub planner: PlannerKind,

    // Goals
    /// Waypoints followed on `StartFollow`
    pub tour: Vec<Pose2>,

    /// Target of `GotoDefault`
    pub default_goal: Pose2,

    /// Active manual command, overrides pose control while it lasts
    pub nudge: Option<Nudge>,

    // Outputs
    /// Demand applied on the last cycle
    pub last_cmd: VelocityCmd,

    /// Telemetry from the last cycle
    pub sim_tm: SimTm,

    /// Planning results not yet collected by the executable
    pub pending_plans: Vec<PlanTm>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Discard any goal and manual command.
    pub fn stop(&mut self) {
        self.pose_ctrl.clear();

        if self.nudge.take().is_some() {
            info!("Nudge cancelled");
        }
    }

    /// Take the planning results produced since the last call.
    pub fn take_plans(&mut self) -> Vec<PlanTm> {
        std::mem::take(&mut self.pending_plans)
    }

    /// True if the robot has no goal left to reach and no manual command.
    pub fn is_motion_complete(&self) -> bool {
        self.nudge.is_none() && !self.pose_ctrl.is_active()
    }
}
