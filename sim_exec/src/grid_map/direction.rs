//! Compass directions between neighbouring cells

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One of the eight compass neighbours of a cell.
///
/// The discriminant is the direction code used in map descriptions. North is
/// the map's Y+ axis and East the map's X+ axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    N = 0,
    NE = 1,
    E = 2,
    SE = 3,
    S = 4,
    SW = 5,
    W = 6,
    NW = 7,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Offset in the interstitial grid for each direction, indexed by code.
const OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ALL: [Direction; 8] = [
    Direction::N,
    Direction::NE,
    Direction::E,
    Direction::SE,
    Direction::S,
    Direction::SW,
    Direction::W,
    Direction::NW,
];

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Direction {
    /// Directions the robot can move in, in the order the planners consider
    /// them.
    pub const AXIS_ALIGNED: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Get the direction for a code, or `None` if the code is not in 0..8.
    pub fn from_code(code: u8) -> Option<Self> {
        ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Offset of this direction in the interstitial grid.
    pub fn offset(self) -> (isize, isize) {
        OFFSETS[self as usize]
    }

    /// True for N, E, S and W.
    pub fn is_axis_aligned(self) -> bool {
        self.code() % 2 == 0
    }

    /// The direction rotated clockwise by 90 degrees.
    pub fn right(self) -> Self {
        ALL[(self.code() as usize + 2) % 8]
    }

    /// The opposite direction.
    pub fn opposite(self) -> Self {
        ALL[(self.code() as usize + 4) % 8]
    }

    /// Snap a heading to the nearest axis-aligned direction.
    ///
    /// Headings are measured anticlockwise from East, so 0 is `E`, pi/2 is `N`
    /// and so on. Halfway headings round towards the anticlockwise neighbour.
    pub fn from_heading(theta_rad: f64) -> Self {
        let quarter_turns = (theta_rad / (PI / 2.0) + 0.5).floor() as i64;

        match quarter_turns.rem_euclid(4) {
            0 => Direction::E,
            1 => Direction::N,
            2 => Direction::W,
            _ => Direction::S,
        }
    }

    /// The heading pointing along this direction, in (-pi, pi].
    pub fn heading_rad(self) -> f64 {
        let (dx, dy) = self.offset();
        (dy as f64).atan2(dx as f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes() {
        for code in 0..8u8 {
            let d = Direction::from_code(code).unwrap();
            assert_eq!(d.code(), code);
            assert_eq!(d.is_axis_aligned(), code % 2 == 0);
        }
        assert_eq!(Direction::from_code(8), None);

        assert_eq!(Direction::N.offset(), (0, 1));
        assert_eq!(Direction::E.offset(), (1, 0));
        assert_eq!(Direction::S.offset(), (0, -1));
        assert_eq!(Direction::W.offset(), (-1, 0));
    }

    #[test]
    fn test_rotations() {
        assert_eq!(Direction::N.right(), Direction::E);
        assert_eq!(Direction::W.right(), Direction::N);
        assert_eq!(Direction::NW.right(), Direction::NE);
        assert_eq!(Direction::E.opposite(), Direction::W);
    }

    #[test]
    fn test_from_heading() {
        assert_eq!(Direction::from_heading(0.0), Direction::E);
        assert_eq!(Direction::from_heading(PI / 2.0), Direction::N);
        assert_eq!(Direction::from_heading(PI), Direction::W);
        assert_eq!(Direction::from_heading(-PI), Direction::W);
        assert_eq!(Direction::from_heading(-PI / 2.0), Direction::S);
        assert_eq!(Direction::from_heading(3.0 * PI / 2.0), Direction::S);
        assert_eq!(Direction::from_heading(0.7), Direction::E);
        assert_eq!(Direction::from_heading(0.9), Direction::N);
        assert_eq!(Direction::from_heading(-2.5), Direction::W);
        assert_eq!(Direction::from_heading(-5.0 * PI / 2.0), Direction::S);
    }

    #[test]
    fn test_heading_rad() {
        assert!((Direction::N.heading_rad() - PI / 2.0).abs() < 1e-12);
        assert!((Direction::W.heading_rad() - PI).abs() < 1e-12);
        assert!(Direction::E.heading_rad().abs() < 1e-12);
    }
}
