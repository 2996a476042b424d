//! # Pose control module
//!
//! Pose control drives the robot to a target pose, or through a sequence of
//! target poses, using a pose regulation law in polar coordinates about the
//! target:
//!
//! ```text
//! rho   = |target - pose|
//! alpha = bearing - theta
//! beta  = bearing - target.theta
//!
//! v = kp * rho
//! w = ka * alpha + kb * beta
//! ```
//!
//! where `bearing` is the direction from the robot to the target. When
//! following a sequence the speed is floored at `v_min_ms` so the robot doesn't
//! crawl into the intermediate waypoints.
//!
//! The gains are derived once from the platform limits and the longest leg of
//! the session's waypoints, so that the speed demand never exceeds the limit on
//! the longest leg.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use controllers::*;
pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during pose control.
#[derive(Debug, thiserror::Error)]
pub enum PoseCtrlError {
    #[error("Could not load pose control parameters: {0}")]
    ParamLoad(#[from] util::params::LoadError),

    #[error("Cannot derive gains from a leg length of {0} m")]
    InvalidLegLength(f64),

    #[error("Invalid pose control limits: {0}")]
    InvalidLimits(String),
}
