//! Pose control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{max_leg_length, Gains, Params, PoseController, PoseCtrlError, VelocityCmd};
use crate::robot::Pose2;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose control module state
///
/// Holds the session's gains and the active controller, if any. Issuing a new
/// goal discards the previous controller.
#[derive(Debug, Clone)]
pub struct PoseCtrl {
    params: Params,

    gains: Gains,

    controller: Option<PoseController>,
}

/// Status report for pose control processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// True if there is a controller and it hasn't finished
    pub active: bool,

    /// Current waypoint index when following a sequence
    pub waypoint_idx: Option<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseCtrl {
    /// Create a new instance with gains derived from the reference leg length
    /// in the parameters.
    pub fn new(params: Params) -> Result<Self, PoseCtrlError> {
        let gains = Gains::derive(&params, params.reference_leg_m)?;

        Ok(Self {
            params,
            gains,
            controller: None,
        })
    }

    /// Re-derive the gains from the longest leg of the given waypoints.
    ///
    /// If there are fewer than two waypoints the reference leg length is
    /// used instead.
    pub fn derive_gains_for(&mut self, waypoints: &[Pose2]) -> Result<Gains, PoseCtrlError> {
        let max_leg_m = max_leg_length(waypoints).unwrap_or(self.params.reference_leg_m);
        self.gains = Gains::derive(&self.params, max_leg_m)?;

        debug!("Pose control gains: {:?}", self.gains);

        Ok(self.gains)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    pub fn controller(&self) -> Option<&PoseController> {
        self.controller.as_ref()
    }

    /// Follow the given waypoints in order, replacing any current goal.
    pub fn follow(&mut self, waypoints: Vec<Pose2>) {
        info!("Following {} waypoints", waypoints.len());
        self.controller = Some(PoseController::waypoint_sequence(
            waypoints,
            self.gains,
            &self.params,
        ));
    }

    /// Drive to the given pose, replacing any current goal.
    pub fn goto(&mut self, target: Pose2) {
        info!(
            "Driving to ({:.3}, {:.3}, {:.3})",
            target.x_m, target.y_m, target.theta_rad
        );
        self.controller = Some(PoseController::single_pose(target, self.gains, &self.params));
    }

    /// Discard the current goal.
    pub fn clear(&mut self) {
        if self.controller.take().is_some() {
            info!("Pose control goal cleared");
        }
    }

    /// True if there is a goal which hasn't been reached yet.
    pub fn is_active(&self) -> bool {
        self.controller.as_ref().map_or(false, |c| !c.is_finished())
    }

    /// Compute the demand for the current pose.
    pub fn compute_control(&mut self, pose: &Pose2) -> VelocityCmd {
        match self.controller.as_mut() {
            Some(c) => c.compute_control(pose),
            None => VelocityCmd::default(),
        }
    }

    fn status(&self) -> StatusReport {
        StatusReport {
            active: self.is_active(),
            waypoint_idx: self.controller.as_ref().and_then(PoseController::cursor),
        }
    }
}

impl Default for PoseCtrl {
    fn default() -> Self {
        let params = Params::default();
        Self {
            gains: Gains {
                kp: params.v_max_ms / params.reference_leg_m,
                ka: params.w_max_rads / std::f64::consts::FRAC_PI_4,
                kb: params.w_max_rads / std::f64::consts::FRAC_PI_2,
            },
            params,
            controller: None,
        }
    }
}

impl State for PoseCtrl {
    type InitData = &'static str;
    type InitError = PoseCtrlError;

    type InputData = Pose2;
    type OutputData = VelocityCmd;
    type StatusReport = StatusReport;
    type ProcError = PoseCtrlError;

    /// Initialise the pose control module.
    ///
    /// Expected init data is the path to the parameter file. If the file
    /// doesn't exist the default parameters are used.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load_or_default(init_data)?;

        *self = PoseCtrl::new(params)?;

        Ok(())
    }

    /// Compute the demand for the given pose.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let cmd = self.compute_control(input_data);

        Ok((cmd, self.status()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_matches_new() {
        let new = PoseCtrl::new(Params::default()).unwrap();
        let default = PoseCtrl::default();

        assert_eq!(new.gains(), default.gains());
    }

    #[test]
    fn test_goal_replacement() {
        let mut ctrl = PoseCtrl::default();

        let (cmd, status) = ctrl.proc(&Pose2::default()).unwrap();
        assert_eq!(cmd, VelocityCmd::default());
        assert!(!status.active);

        ctrl.follow(vec![Pose2::new(1.0, 0.0, 0.0), Pose2::new(2.0, 0.0, 0.0)]);
        let (_, status) = ctrl.proc(&Pose2::default()).unwrap();
        assert!(status.active);
        assert_eq!(status.waypoint_idx, Some(0));

        // A new goal replaces the sequence
        ctrl.goto(Pose2::new(0.0, 1.0, 0.0));
        let (cmd, status) = ctrl.proc(&Pose2::default()).unwrap();
        assert!(status.active);
        assert_eq!(status.waypoint_idx, None);
        assert!(cmd.speed_ms > 0.0);

        ctrl.clear();
        assert!(!ctrl.is_active());
        assert!(ctrl.controller().is_none());
    }

    #[test]
    fn test_derive_gains_for() {
        let mut ctrl = PoseCtrl::default();

        let gains = ctrl
            .derive_gains_for(&[Pose2::new(0.0, 0.0, 0.0), Pose2::new(0.0, 2.0, 0.0)])
            .unwrap();
        assert!((gains.kp - 0.2).abs() < 1e-12);

        // Falls back to the reference leg
        let gains = ctrl.derive_gains_for(&[]).unwrap();
        assert!((gains.kp - 0.4).abs() < 1e-12);
    }
}
