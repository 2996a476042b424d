//! Implementations for the robot state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::{Matrix2, Vector2};
use serde::Serialize;

// Internal
use super::{Lift, Params, RobotError};
use comms_if::{tc::PoseSpec, tm::SimTm};
use util::{maths::norm_pi, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose in the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose2 {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Heading anticlockwise from the map's X+ axis, in (-pi, pi].
    ///
    /// Units: radians
    pub theta_rad: f64,
}

/// The robot's pose as seen by a renderer.
///
/// The renderer's frame has its zero heading along the map's Y+ axis and
/// measures headings clockwise, so `theta_rad` here is `pi/2 - theta` of the
/// physical pose. This is for presentation only and never feeds back into the
/// model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RenderPose {
    pub x_m: f64,
    pub y_m: f64,
    pub theta_rad: f64,
    pub left_wheel_rad: f64,
    pub right_wheel_rad: f64,
    pub lift_rad: f64,
}

/// State of the simulated robot.
#[derive(Debug, Clone)]
pub struct RobotState {
    params: Params,

    pose: Pose2,

    /// Accumulated wheel rotations
    left_wheel_rad: f64,
    right_wheel_rad: f64,

    /// Wheel rates from the last speed update
    left_wheel_rads: f64,
    right_wheel_rads: f64,

    /// Demands from the last advance
    speed_ms: f64,
    turn_rate_rads: f64,

    lift: Lift,
}

/// Input data to the robot model.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second
    pub turn_rate_rads: f64,

    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for robot processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// False if the wheel radius prevented the wheel speeds being updated
    pub wheel_speeds_updated: bool,

    /// True if the lift is still moving towards its target
    pub lift_moving: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(x_m: f64, y_m: f64, theta_rad: f64) -> Self {
        Self { x_m, y_m, theta_rad }
    }

    /// Distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose2) -> f64 {
        (other.x_m - self.x_m).hypot(other.y_m - self.y_m)
    }
}

impl From<PoseSpec> for Pose2 {
    fn from(spec: PoseSpec) -> Self {
        Self::new(spec.x_m, spec.y_m, spec.theta_rad)
    }
}

impl From<Pose2> for PoseSpec {
    fn from(pose: Pose2) -> Self {
        PoseSpec::new(pose.x_m, pose.y_m, pose.theta_rad)
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl RobotState {
    /// Create a new robot at the initial state given in the parameters.
    pub fn new(params: Params) -> Self {
        Self {
            pose: Pose2::new(
                params.initial_x_m,
                params.initial_y_m,
                norm_pi(params.initial_heading_deg.to_radians()),
            ),
            left_wheel_rad: 0.0,
            right_wheel_rad: 0.0,
            left_wheel_rads: 0.0,
            right_wheel_rads: 0.0,
            speed_ms: 0.0,
            turn_rate_rads: 0.0,
            lift: Lift::new(params.initial_lift_deg.to_radians()),
            params,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn pose(&self) -> Pose2 {
        self.pose
    }

    pub fn lift(&self) -> &Lift {
        &self.lift
    }

    pub fn lift_mut(&mut self) -> &mut Lift {
        &mut self.lift
    }

    /// Wheel rotations as `(left, right)`.
    pub fn wheel_angles_rad(&self) -> (f64, f64) {
        (self.left_wheel_rad, self.right_wheel_rad)
    }

    /// Wheel rates as `(left, right)`.
    pub fn wheel_rates_rads(&self) -> (f64, f64) {
        (self.left_wheel_rads, self.right_wheel_rads)
    }

    /// Compute the wheel rates for the given speed and turn rate.
    ///
    /// If the wheel radius isn't positive the previous rates are kept and
    /// `false` is returned.
    pub fn set_wheel_speeds(&mut self, speed_ms: f64, turn_rate_rads: f64) -> bool {
        let r = self.params.wheel_radius_m;
        let l = self.params.wheel_track_m;

        // Written this way round so that a NaN radius is also rejected
        if !(r > 0.0) {
            return false;
        }

        let ik = Matrix2::new(
            1.0 / r, l / (2.0 * r),
            1.0 / r, -l / (2.0 * r),
        );

        let rates = ik * Vector2::new(speed_ms, turn_rate_rads);

        self.right_wheel_rads = rates[0];
        self.left_wheel_rads = rates[1];

        true
    }

    /// Advance the robot by one time step with the given demands.
    ///
    /// Returns the new pose in the rendering frame.
    pub fn advance(&mut self, speed_ms: f64, turn_rate_rads: f64, dt_s: f64) -> RenderPose {
        self.speed_ms = speed_ms;
        self.turn_rate_rads = turn_rate_rads;

        self.set_wheel_speeds(speed_ms, turn_rate_rads);

        // ---- POSE ----

        self.pose.x_m += speed_ms * self.pose.theta_rad.cos() * dt_s;
        self.pose.y_m += speed_ms * self.pose.theta_rad.sin() * dt_s;
        self.pose.theta_rad = norm_pi(self.pose.theta_rad + turn_rate_rads * dt_s);

        // ---- WHEELS ----

        self.left_wheel_rad = norm_pi(self.left_wheel_rad + self.left_wheel_rads * dt_s);
        self.right_wheel_rad = norm_pi(self.right_wheel_rad + self.right_wheel_rads * dt_s);

        // ---- LIFT ----

        self.lift.step(dt_s);

        trace!(
            "Robot pose: ({:.4}, {:.4}, {:.4}), lift {:.4}",
            self.pose.x_m,
            self.pose.y_m,
            self.pose.theta_rad,
            self.lift.angle_rad()
        );

        self.render_pose()
    }

    /// The current pose in the rendering frame.
    pub fn render_pose(&self) -> RenderPose {
        RenderPose {
            x_m: self.pose.x_m,
            y_m: self.pose.y_m,
            theta_rad: norm_pi(std::f64::consts::FRAC_PI_2 - self.pose.theta_rad),
            left_wheel_rad: self.left_wheel_rad,
            right_wheel_rad: self.right_wheel_rad,
            lift_rad: self.lift.angle_rad(),
        }
    }

    /// Physical state of the robot as a telemetry record.
    ///
    /// The controller fields are left at their defaults for the caller to
    /// fill in.
    pub fn telemetry(&self, time_s: f64) -> SimTm {
        SimTm {
            time_s,
            x_m: self.pose.x_m,
            y_m: self.pose.y_m,
            theta_rad: self.pose.theta_rad,
            speed_ms: self.speed_ms,
            turn_rate_rads: self.turn_rate_rads,
            left_wheel_rad: self.left_wheel_rad,
            right_wheel_rad: self.right_wheel_rad,
            left_wheel_rads: self.left_wheel_rads,
            right_wheel_rads: self.right_wheel_rads,
            lift_rad: self.lift.angle_rad(),
            lift_target_rad: self.lift.target_rad(),
            ..Default::default()
        }
    }
}

impl State for RobotState {
    type InitData = &'static str;
    type InitError = RobotError;

    type InputData = InputData;
    type OutputData = RenderPose;
    type StatusReport = StatusReport;
    type ProcError = RobotError;

    /// Initialise the robot model.
    ///
    /// Expected init data is the path to the parameter file. If the file
    /// doesn't exist the default parameters are used.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load_or_default(init_data)?;

        *self = RobotState::new(params);

        info!(
            "Robot initialised at ({}, {}) heading {} deg",
            params.initial_x_m, params.initial_y_m, params.initial_heading_deg
        );

        Ok(())
    }

    /// Advance the robot by one time step.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !input_data.speed_ms.is_finite() || !input_data.turn_rate_rads.is_finite() {
            return Err(RobotError::NonFiniteDemand {
                speed_ms: input_data.speed_ms,
                turn_rate_rads: input_data.turn_rate_rads,
            });
        }

        if !(input_data.dt_s > 0.0) || !input_data.dt_s.is_finite() {
            return Err(RobotError::InvalidTimeStep(input_data.dt_s));
        }

        let output = self.advance(input_data.speed_ms, input_data.turn_rate_rads, input_data.dt_s);

        let report = StatusReport {
            wheel_speeds_updated: self.params.wheel_radius_m > 0.0,
            lift_moving: self.lift.is_moving(),
        };

        Ok((output, report))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn in_range(a: f64) -> bool {
        a > -PI && a <= PI
    }

    #[test]
    fn test_new() {
        let robot = RobotState::default();

        assert!((robot.pose().theta_rad - PI / 2.0).abs() < 1e-12);
        assert!((robot.lift().angle_rad() - PI / 2.0).abs() < 1e-12);
        assert_eq!(robot.wheel_angles_rad(), (0.0, 0.0));
    }

    #[test]
    fn test_wheel_speeds() {
        let mut robot = RobotState::default();
        let r = robot.params().wheel_radius_m;
        let l = robot.params().wheel_track_m;

        assert!(robot.set_wheel_speeds(0.4, 0.0));
        let (left, right) = robot.wheel_rates_rads();
        assert!((left - 0.4 / r).abs() < 1e-9);
        assert!((right - 0.4 / r).abs() < 1e-9);

        assert!(robot.set_wheel_speeds(0.0, 1.0));
        let (left, right) = robot.wheel_rates_rads();
        assert!((right - l / (2.0 * r)).abs() < 1e-9);
        assert!((left + l / (2.0 * r)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_radius_keeps_speeds() {
        let mut robot = RobotState::new(Params {
            wheel_radius_m: 0.0,
            ..Default::default()
        });

        assert!(!robot.set_wheel_speeds(0.4, 0.2));
        assert_eq!(robot.wheel_rates_rads(), (0.0, 0.0));

        // The pose is still integrated
        robot.advance(0.4, 0.0, 0.5);
        assert!((robot.pose().y_m - 0.2).abs() < 1e-12);
        assert_eq!(robot.wheel_angles_rad(), (0.0, 0.0));
    }

    #[test]
    fn test_advance() {
        let mut robot = RobotState::new(Params {
            initial_heading_deg: 0.0,
            ..Default::default()
        });

        let render = robot.advance(0.2, 0.0, 0.5);
        assert!((robot.pose().x_m - 0.1).abs() < 1e-12);
        assert!(robot.pose().y_m.abs() < 1e-12);

        // Heading 0 in the map frame is pi/2 in the rendering frame
        assert!((render.theta_rad - PI / 2.0).abs() < 1e-12);
        assert!((render.x_m - 0.1).abs() < 1e-12);

        let tm = robot.telemetry(0.5);
        assert_eq!(tm.time_s, 0.5);
        assert_eq!(tm.speed_ms, 0.2);
        assert!(!tm.ctrl_finished);
    }

    #[test]
    fn test_angles_stay_normalised() {
        let mut robot = RobotState::default();
        robot.lift_mut().lower(0.3);

        for i in 0..2000 {
            let w = if i < 1000 { 3.0 } else { -7.5 };
            robot.advance(0.8, w, 0.05);

            let (left, right) = robot.wheel_angles_rad();
            assert!(in_range(robot.pose().theta_rad));
            assert!(in_range(left));
            assert!(in_range(right));
            assert!(in_range(robot.lift().angle_rad()));
            assert!(in_range(robot.render_pose().theta_rad));
        }
    }

    #[test]
    fn test_proc() {
        let mut robot = RobotState::default();

        let (out, report) = robot
            .proc(&InputData { speed_ms: 0.1, turn_rate_rads: 0.0, dt_s: 0.05 })
            .unwrap();
        assert!((out.y_m - 0.005).abs() < 1e-12);
        assert!(report.wheel_speeds_updated);
        assert!(!report.lift_moving);

        assert!(matches!(
            robot.proc(&InputData { speed_ms: f64::NAN, turn_rate_rads: 0.0, dt_s: 0.05 }),
            Err(RobotError::NonFiniteDemand { .. })
        ));
        assert!(matches!(
            robot.proc(&InputData { speed_ms: 0.0, turn_rate_rads: 0.0, dt_s: 0.0 }),
            Err(RobotError::InvalidTimeStep(_))
        ));
    }
}
