//! # Robot module
//!
//! Kinematic model of the differential drive robot and its lift.
//!
//! The robot's pose is integrated with a simple Euler scheme from the
//! commanded linear speed and turn rate. Wheel speeds are found from the
//! inverse kinematics of the drive:
//!
//! ```text
//! | w_right |   | 1/r   L/(2r) |   | v |
//! |         | = |              | * |   |
//! | w_left  |   | 1/r  -L/(2r) |   | w |
//! ```
//!
//! where `r` is the wheel radius and `L` the wheel track. All angles held by
//! the model are kept in the range (-pi, pi].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod lift;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use lift::*;
pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while stepping the robot model.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Could not load the robot parameters: {0}")]
    ParamLoad(#[from] util::params::LoadError),

    #[error("Demands must be finite (speed {speed_ms} m/s, turn rate {turn_rate_rads} rad/s)")]
    NonFiniteDemand { speed_ms: f64, turn_rate_rads: f64 },

    #[error("The time step must be positive and finite (got {0} s)")]
    InvalidTimeStep(f64),
}
