//! # Pose controllers
//!
//! Two controllers share the same regulation law. `SinglePose` drives to one
//! target and finishes once it is within tolerance. `WaypointSequence` steps
//! through its waypoints, and once the last is reached it wraps its cursor
//! back to the start and finishes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// Internal
use super::{Params, PoseCtrlError};
use crate::robot::Pose2;
use util::maths::norm_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of the regulation law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gains {
    /// Distance gain
    pub kp: f64,

    /// Heading to target gain
    pub ka: f64,

    /// Final heading gain
    pub kb: f64,
}

/// Error between a pose and a target in polar coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarError {
    /// Distance to the target
    ///
    /// Units: meters
    pub rho: f64,

    /// Bearing of the target relative to the current heading
    ///
    /// Units: radians
    pub alpha: f64,

    /// Bearing of the target relative to the target heading
    ///
    /// Units: radians
    pub beta: f64,
}

/// A velocity demand for the robot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VelocityCmd {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second
    pub turn_rate_rads: f64,
}

/// A pose controller.
#[derive(Debug, Clone, Serialize)]
pub enum PoseController {
    /// Follows a sequence of poses in order.
    WaypointSequence {
        waypoints: Vec<Pose2>,
        cursor: usize,
        gains: Gains,
        v_min_ms: f64,
        tolerance_m: f64,
        finished: bool,
    },

    /// Drives to a single pose.
    SinglePose {
        target: Pose2,
        gains: Gains,
        tolerance_m: f64,
        finished: bool,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gains {
    /// Derive the gains from the platform limits and the longest leg that
    /// will be driven.
    pub fn derive(params: &Params, max_leg_m: f64) -> Result<Self, PoseCtrlError> {
        if !(max_leg_m > 0.0) || !max_leg_m.is_finite() {
            return Err(PoseCtrlError::InvalidLegLength(max_leg_m));
        }

        if !(params.v_max_ms > 0.0) || !(params.w_max_rads > 0.0) {
            return Err(PoseCtrlError::InvalidLimits(format!(
                "v_max_ms = {}, w_max_rads = {}",
                params.v_max_ms, params.w_max_rads
            )));
        }

        Ok(Self {
            kp: params.v_max_ms / max_leg_m,
            ka: params.w_max_rads / FRAC_PI_4,
            kb: params.w_max_rads / FRAC_PI_2,
        })
    }
}

/// Length of the longest leg between consecutive poses.
///
/// Returns `None` if there are fewer than two poses.
pub fn max_leg_length(poses: &[Pose2]) -> Option<f64> {
    poses
        .windows(2)
        .map(|w| w[0].distance_to(&w[1]))
        .fold(None, |max, d| match max {
            Some(m) if m >= d => Some(m),
            _ => Some(d),
        })
}

impl PolarError {
    /// Calculate the error of `pose` relative to `target`.
    pub fn between(pose: &Pose2, target: &Pose2) -> Self {
        let dx = target.x_m - pose.x_m;
        let dy = target.y_m - pose.y_m;
        let bearing = dy.atan2(dx);

        Self {
            rho: dx.hypot(dy),
            alpha: norm_pi(bearing - pose.theta_rad),
            beta: norm_pi(bearing - target.theta_rad),
        }
    }
}

impl VelocityCmd {
    pub fn new(speed_ms: f64, turn_rate_rads: f64) -> Self {
        Self { speed_ms, turn_rate_rads }
    }

    /// Apply the regulation law to the error.
    fn from_error(error: &PolarError, gains: &Gains) -> Self {
        Self {
            speed_ms: gains.kp * error.rho,
            turn_rate_rads: gains.ka * error.alpha + gains.kb * error.beta,
        }
    }
}

impl PoseController {
    /// Create a controller which follows the waypoints in order.
    ///
    /// An empty list of waypoints gives a controller which is already
    /// finished.
    pub fn waypoint_sequence(waypoints: Vec<Pose2>, gains: Gains, params: &Params) -> Self {
        PoseController::WaypointSequence {
            finished: waypoints.is_empty(),
            waypoints,
            cursor: 0,
            gains,
            v_min_ms: params.v_min_ms,
            tolerance_m: params.tolerance_m,
        }
    }

    /// Create a controller which drives to the given pose.
    pub fn single_pose(target: Pose2, gains: Gains, params: &Params) -> Self {
        PoseController::SinglePose {
            target,
            gains,
            tolerance_m: params.tolerance_m,
            finished: false,
        }
    }

    /// Compute the velocity demand for the current pose.
    ///
    /// Once the controller is finished this always returns a zero demand. On
    /// the cycle a target is reached the demand computed for that cycle is
    /// still returned.
    pub fn compute_control(&mut self, pose: &Pose2) -> VelocityCmd {
        match self {
            PoseController::WaypointSequence {
                waypoints,
                cursor,
                gains,
                v_min_ms,
                tolerance_m,
                finished,
            } => {
                if *finished {
                    return VelocityCmd::default();
                }

                let target = match waypoints.get(*cursor) {
                    Some(t) => *t,
                    None => {
                        *finished = true;
                        *cursor = 0;
                        return VelocityCmd::default();
                    }
                };

                let error = PolarError::between(pose, &target);
                let mut cmd = VelocityCmd::from_error(&error, gains);
                cmd.speed_ms = cmd.speed_ms.max(*v_min_ms);

                if error.rho < *tolerance_m {
                    *cursor += 1;

                    if *cursor >= waypoints.len() {
                        *cursor = 0;
                        *finished = true;
                        info!("Final waypoint reached, sequence complete");
                    } else {
                        debug!("Waypoint reached, advancing to waypoint {}", *cursor);
                    }
                }

                cmd
            }
            PoseController::SinglePose {
                target,
                gains,
                tolerance_m,
                finished,
            } => {
                if *finished {
                    return VelocityCmd::default();
                }

                let error = PolarError::between(pose, target);
                let cmd = VelocityCmd::from_error(&error, gains);

                if error.rho < *tolerance_m {
                    *finished = true;
                    info!(
                        "Target ({:.3}, {:.3}) reached",
                        target.x_m, target.y_m
                    );
                }

                cmd
            }
        }
    }

    /// True once every target of the controller has been reached.
    pub fn is_finished(&self) -> bool {
        match self {
            PoseController::WaypointSequence { finished, .. } => *finished,
            PoseController::SinglePose { finished, .. } => *finished,
        }
    }

    /// Index of the current waypoint, `None` for a single pose controller.
    pub fn cursor(&self) -> Option<usize> {
        match self {
            PoseController::WaypointSequence { cursor, .. } => Some(*cursor),
            PoseController::SinglePose { .. } => None,
        }
    }

    /// The pose currently being driven to.
    pub fn current_target(&self) -> Option<Pose2> {
        match self {
            PoseController::WaypointSequence { waypoints, cursor, finished, .. } => {
                if *finished {
                    None
                } else {
                    waypoints.get(*cursor).copied()
                }
            }
            PoseController::SinglePose { target, finished, .. } => {
                if *finished {
                    None
                } else {
                    Some(*target)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::robot::{self, RobotState};
    use std::f64::consts::PI;

    const DT_S: f64 = 0.05;

    fn robot_at(x_m: f64, y_m: f64, heading_deg: f64) -> RobotState {
        RobotState::new(robot::Params {
            initial_x_m: x_m,
            initial_y_m: y_m,
            initial_heading_deg: heading_deg,
            ..Default::default()
        })
    }

    fn tour() -> Vec<Pose2> {
        vec![
            Pose2::new(0.4, 0.6, PI / 2.0),
            Pose2::new(1.2, 0.8, PI / 4.0),
            Pose2::new(2.0, 1.0, -PI / 4.0),
            Pose2::new(1.4, -0.6, PI),
            Pose2::new(0.4, 0.6, PI / 2.0),
        ]
    }

    #[test]
    fn test_gains() {
        let params = Params::default();
        let gains = Gains::derive(&params, 2.0).unwrap();

        assert!((gains.kp - 0.2).abs() < 1e-12);
        assert!((gains.ka - 4.0 / PI).abs() < 1e-12);
        assert!((gains.kb - 2.0 / PI).abs() < 1e-12);

        assert!(matches!(
            Gains::derive(&params, 0.0),
            Err(PoseCtrlError::InvalidLegLength(_))
        ));
        assert!(matches!(
            Gains::derive(&Params { v_max_ms: 0.0, ..params }, 1.0),
            Err(PoseCtrlError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_max_leg_length() {
        assert_eq!(max_leg_length(&[]), None);
        assert_eq!(max_leg_length(&[Pose2::default()]), None);

        let poses = [
            Pose2::new(0.0, 0.0, 0.0),
            Pose2::new(3.0, 4.0, 0.0),
            Pose2::new(3.0, 5.0, 0.0),
        ];
        assert_eq!(max_leg_length(&poses), Some(5.0));
    }

    #[test]
    fn test_polar_error() {
        let error = PolarError::between(
            &Pose2::new(0.0, 0.0, PI / 2.0),
            &Pose2::new(1.0, 0.0, PI / 2.0),
        );

        assert!((error.rho - 1.0).abs() < 1e-12);
        assert!((error.alpha + PI / 2.0).abs() < 1e-12);
        assert!((error.beta + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_pose_converges() {
        let gains = Gains { kp: 1.0, ka: 1.0, kb: 1.0 };
        let params = Params::default();
        let target = Pose2::new(0.0, 0.0, 0.0);

        let mut robot = robot_at(1.0, 0.0, 0.0);
        let mut ctrl = PoseController::single_pose(target, gains, &params);

        let mut ticks = 0;
        loop {
            let error = PolarError::between(&robot.pose(), &target);
            let cmd = ctrl.compute_control(&robot.pose());

            if ctrl.is_finished() {
                assert!(error.rho < params.tolerance_m);
                break;
            }

            robot.advance(cmd.speed_ms, cmd.turn_rate_rads, DT_S);
            ticks += 1;
            assert!(ticks < 1000, "controller did not converge");
        }

        // Finished controllers demand nothing
        assert_eq!(ctrl.compute_control(&robot.pose()), VelocityCmd::default());
        assert_eq!(ctrl.current_target(), None);
        assert_eq!(ctrl.cursor(), None);
    }

    #[test]
    fn test_waypoint_sequence_wraps() {
        let params = Params::default();
        let waypoints = vec![Pose2::new(0.5, 0.0, 0.0), Pose2::new(1.0, 0.0, 0.0)];
        let gains = Gains::derive(&params, 0.5).unwrap();

        let mut robot = robot_at(0.0, 0.0, 0.0);
        let mut ctrl = PoseController::waypoint_sequence(waypoints, gains, &params);

        let mut seen_second = false;
        let mut ticks = 0;
        while !ctrl.is_finished() {
            let cmd = ctrl.compute_control(&robot.pose());

            // The speed floor holds while following
            assert!(cmd.speed_ms >= params.v_min_ms);

            if ctrl.cursor() == Some(1) {
                seen_second = true;
            }

            robot.advance(cmd.speed_ms, cmd.turn_rate_rads, DT_S);
            ticks += 1;
            assert!(ticks < 1000, "sequence did not complete");
        }

        assert!(seen_second);
        assert_eq!(ctrl.cursor(), Some(0));
        assert_eq!(ctrl.compute_control(&robot.pose()), VelocityCmd::default());
        assert_eq!(ctrl.compute_control(&robot.pose()), VelocityCmd::default());
        assert!(ctrl.is_finished());
    }

    #[test]
    fn test_empty_sequence_is_finished() {
        let params = Params::default();
        let gains = Gains::derive(&params, 1.0).unwrap();
        let mut ctrl = PoseController::waypoint_sequence(Vec::new(), gains, &params);

        assert!(ctrl.is_finished());
        assert_eq!(ctrl.compute_control(&Pose2::default()), VelocityCmd::default());
        assert_eq!(ctrl.cursor(), Some(0));
    }

    #[test]
    fn test_tour_completes() {
        let params = Params::default();
        let waypoints = tour();
        let max_leg = max_leg_length(&waypoints).unwrap();
        let gains = Gains::derive(&params, max_leg).unwrap();

        let mut robot = robot_at(0.0, 0.0, 90.0);
        let mut ctrl = PoseController::waypoint_sequence(waypoints, gains, &params);

        let mut ticks = 0;
        while !ctrl.is_finished() {
            let cmd = ctrl.compute_control(&robot.pose());
            robot.advance(cmd.speed_ms, cmd.turn_rate_rads, DT_S);
            ticks += 1;
            assert!(ticks < 5000, "tour did not complete");
        }

        // Tour ends where it started
        let end = Pose2::new(0.4, 0.6, PI / 2.0);
        assert!(robot.pose().distance_to(&end) < 0.1);
    }
}
