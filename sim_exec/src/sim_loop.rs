//! # Simulation loop
//!
//! The loop advances the simulation by one fixed step per call to
//! [`SimLoop::step`]. Each step performs exactly one control computation and
//! one integration of the robot model. Time comes from an injected [`Clock`],
//! so stepping is deterministic and needs no wall-clock timers. Pacing against
//! the wall clock is left to the caller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};

// Internal
use comms_if::{tc::Tc, tm::SimTm};
use crate::{
    data_store::DataStore,
    grid_map::{Cell, GridMap, GridMapError, PlannerKind},
    params::SimExecParams,
    pose_ctrl::{PoseCtrl, PoseCtrlError, VelocityCmd},
    robot::{Pose2, RenderPose, RobotState},
    tc_processor,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of simulated time.
pub trait Clock {
    /// Advance the clock by one tick, returning the length of the tick in
    /// seconds.
    fn tick(&mut self) -> f64;

    /// Simulated time since the clock started.
    fn now_s(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A clock which advances by the same period on every tick.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    period_s: f64,
    num_ticks: u64,
}

/// The simulation loop.
pub struct SimLoop<C: Clock = FixedStepClock> {
    ds: DataStore,
    clock: C,

    /// Trajectory archive, one record per step
    archiver: Archiver,
}

/// Outputs of one simulation step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Pose for the renderer
    pub render: RenderPose,

    /// Physical state for telemetry and archiving
    pub tm: SimTm,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while running the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("No path from cell {start:?} to cell {goal:?}, even with every removed wall restored")]
    GoalUnreachable { start: Cell, goal: Cell },

    #[error("The robot at ({x_m:.3}, {y_m:.3}) is outside the map")]
    RobotOffMap { x_m: f64, y_m: f64 },

    #[error("No map is loaded")]
    NoMap,

    #[error("Map error: {0}")]
    GridMap(#[from] GridMapError),

    #[error("Pose control error: {0}")]
    PoseCtrl(#[from] PoseCtrlError),

    #[error("Invalid telecommand: {0}")]
    InvalidTc(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FixedStepClock {
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s,
            num_ticks: 0,
        }
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }
}

impl Clock for FixedStepClock {
    fn tick(&mut self) -> f64 {
        self.num_ticks += 1;
        self.period_s
    }

    fn now_s(&self) -> f64 {
        // Multiplied rather than accumulated so the time doesn't drift
        self.num_ticks as f64 * self.period_s
    }
}

impl SimLoop<FixedStepClock> {
    /// Create a new loop stepping at the period given in the parameters.
    pub fn new(
        params: &SimExecParams,
        robot: RobotState,
        pose_ctrl: PoseCtrl,
        map: Option<GridMap>,
    ) -> Result<Self, SimError> {
        Self::with_clock(params, robot, pose_ctrl, map, FixedStepClock::new(params.cycle_period_s))
    }
}

impl<C: Clock> SimLoop<C> {
    /// Create a new loop driven by the given clock.
    ///
    /// The pose control gains are derived from the longest leg of the tour.
    pub fn with_clock(
        params: &SimExecParams,
        robot: RobotState,
        mut pose_ctrl: PoseCtrl,
        map: Option<GridMap>,
        clock: C,
    ) -> Result<Self, SimError> {
        let tour: Vec<Pose2> = params.tour.iter().copied().map(Pose2::from).collect();

        let gains = pose_ctrl.derive_gains_for(&tour)?;
        info!(
            "Pose control gains: kp = {:.4}, ka = {:.4}, kb = {:.4}",
            gains.kp, gains.ka, gains.kb
        );

        let mut ds = DataStore {
            robot,
            pose_ctrl,
            map,
            planner: params.planner,
            tour,
            default_goal: Pose2::from(params.default_goal),
            ..Default::default()
        };

        ds.sim_time_s = clock.now_s();
        ds.sim_tm = ds.robot.telemetry(ds.sim_time_s);
        ds.sim_tm.ctrl_finished = true;

        Ok(Self {
            ds,
            clock,
            archiver: Archiver::default(),
        })
    }

    /// Start archiving the telemetry of each step into the session.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.archiver = Archiver::from_path(session, "sim/trajectory.csv")?;
        Ok(())
    }

    /// Execute a telecommand.
    pub fn exec_tc(&mut self, tc: &Tc) -> Result<(), SimError> {
        tc_processor::exec(&mut self.ds, tc)
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) -> StepOutput {
        let dt_s = self.clock.tick();

        // ---- CONTROL ----

        let pose = self.ds.robot.pose();

        let cmd = match self.ds.nudge.as_mut() {
            Some(nudge) => {
                nudge.remaining_s -= dt_s;
                nudge.cmd
            }
            None => self.ds.pose_ctrl.compute_control(&pose),
        };

        // Clear the nudge once its time has run out, allowing for rounding in
        // the subtraction
        if let Some(nudge) = self.ds.nudge {
            if nudge.remaining_s <= dt_s * 1e-6 {
                self.ds.nudge = None;
                info!("Nudge complete");
            }
        }

        // ---- INTEGRATION ----

        let render = self.ds.robot.advance(cmd.speed_ms, cmd.turn_rate_rads, dt_s);

        // ---- OUTPUTS ----

        self.ds.sim_time_s = self.clock.now_s();
        self.ds.num_cycles += 1;
        self.ds.last_cmd = cmd;

        let mut tm = self.ds.robot.telemetry(self.ds.sim_time_s);
        tm.waypoint_idx = self.ds.pose_ctrl.controller().and_then(|c| c.cursor());
        tm.ctrl_finished = !self.ds.pose_ctrl.is_active();
        self.ds.sim_tm = tm.clone();

        trace!(
            "Cycle {}: demand ({:.4} m/s, {:.4} rad/s)",
            self.ds.num_cycles,
            cmd.speed_ms,
            cmd.turn_rate_rads
        );

        StepOutput { render, tm }
    }

    /// True if the robot has no goal left to reach and no manual command.
    pub fn is_motion_complete(&self) -> bool {
        self.ds.is_motion_complete()
    }

    /// Simulated time since the loop started.
    pub fn sim_time_s(&self) -> f64 {
        self.ds.sim_time_s
    }

    pub fn num_cycles(&self) -> u128 {
        self.ds.num_cycles
    }

    pub fn last_cmd(&self) -> VelocityCmd {
        self.ds.last_cmd
    }

    pub fn robot(&self) -> &RobotState {
        &self.ds.robot
    }

    pub fn map(&self) -> Option<&GridMap> {
        self.ds.map.as_ref()
    }

    pub fn planner(&self) -> PlannerKind {
        self.ds.planner
    }

    pub fn data_store(&self) -> &DataStore {
        &self.ds
    }

    /// Take the planning results produced since the last call.
    pub fn take_plans(&mut self) -> Vec<comms_if::tm::PlanTm> {
        self.ds.take_plans()
    }
}

impl<C: Clock> Archived for SimLoop<C> {
    /// Write the telemetry of the last step.
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.archiver.serialise(&self.ds.sim_tm)
    }
}
