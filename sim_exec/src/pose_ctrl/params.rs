//! Pose control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for pose control
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Maximum speed demand on the longest leg
    pub v_max_ms: f64,

    /// Turn rate used to scale the angular gains
    pub w_max_rads: f64,

    /// Minimum speed demand while following a waypoint sequence
    pub v_min_ms: f64,

    /// Distance under which a target is considered reached
    pub tolerance_m: f64,

    /// Leg length used to derive the speed gain when there is no waypoint
    /// sequence to take it from
    pub reference_leg_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            v_max_ms: 0.4,
            w_max_rads: 1.0,
            v_min_ms: 0.1,
            tolerance_m: 0.03,
            reference_leg_m: 1.0,
        }
    }
}
