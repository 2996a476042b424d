//! # Navigation telecommand data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A target pose in the map frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
    /// Position along the map's X axis in meters.
    pub x_m: f64,

    /// Position along the map's Y axis in meters.
    pub y_m: f64,

    /// Heading in radians, measured anticlockwise from the map's X+ axis.
    pub theta_rad: f64
}

impl PoseSpec {
    pub fn new(x_m: f64, y_m: f64, theta_rad: f64) -> Self {
        Self { x_m, y_m, theta_rad }
    }
}

/// Parses poses written as `x_m,y_m,theta_rad`, as used on the command line.
impl FromStr for PoseSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| format!("Invalid pose \"{}\": {}", s, e))?;

        match vals.as_slice() {
            [x_m, y_m, theta_rad] => Ok(Self::new(*x_m, *y_m, *theta_rad)),
            _ => Err(format!(
                "Expected a pose as x_m,y_m,theta_rad, found {} values", vals.len()
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pose_spec_from_str() {
        assert_eq!("0.4, 0.6,1.5".parse::<PoseSpec>(), Ok(PoseSpec::new(0.4, 0.6, 1.5)));
        assert!("0.4,0.6".parse::<PoseSpec>().is_err());
        assert!("a,b,c".parse::<PoseSpec>().is_err());
    }
}
