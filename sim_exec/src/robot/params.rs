//! Parameters structure for the robot model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the robot model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The radius of the drive wheels.
    ///
    /// A radius which isn't positive disables the wheel speed calculation.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,

    /// Distance between the two drive wheels.
    ///
    /// Units: meters
    pub wheel_track_m: f64,

    // ---- INITIAL STATE ----

    /// Units: meters
    pub initial_x_m: f64,

    /// Units: meters
    pub initial_y_m: f64,

    /// Initial heading, anticlockwise from the map's X+ axis.
    ///
    /// Units: degrees
    pub initial_heading_deg: f64,

    /// Initial angle of the lift.
    ///
    /// Units: degrees
    pub initial_lift_deg: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_radius_m: 0.12223,
            wheel_track_m: 0.02731,
            initial_x_m: 0.0,
            initial_y_m: 0.0,
            initial_heading_deg: 90.0,
            initial_lift_deg: 90.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params() {
        let p: Params = util::params::from_str("initial_x_m = 0.2\ninitial_heading_deg = 0.0").unwrap();

        assert_eq!(p.initial_x_m, 0.2);
        assert_eq!(p.initial_heading_deg, 0.0);
        assert_eq!(p.wheel_radius_m, Params::default().wheel_radius_m);
    }
}
