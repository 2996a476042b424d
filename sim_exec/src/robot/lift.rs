//! Lift actuator model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;
use util::maths::norm_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lift angle when raised.
pub const LIFT_RAISED_DEG: f64 = 90.0;

/// Lift angle when lowered.
pub const LIFT_LOWERED_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The lift (basket) actuator.
///
/// The lift moves towards its target at a constant rate, chosen when the
/// target is set so that the move takes the requested duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lift {
    angle_rad: f64,
    target_rad: f64,

    /// Rate of the current move, `None` to move to the target in one step
    rate_rads: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lift {
    /// Create a stationary lift at the given angle.
    pub fn new(angle_rad: f64) -> Self {
        let angle_rad = norm_pi(angle_rad);
        Self {
            angle_rad,
            target_rad: angle_rad,
            rate_rads: Some(0.0),
        }
    }

    pub fn angle_rad(&self) -> f64 {
        self.angle_rad
    }

    pub fn target_rad(&self) -> f64 {
        self.target_rad
    }

    /// True if the lift has not reached its target.
    pub fn is_moving(&self) -> bool {
        self.angle_rad != self.target_rad
    }

    /// Move the lift to `angle_deg` over `duration_s`.
    ///
    /// A duration which isn't positive moves the lift to the target on the
    /// next step.
    pub fn set_target(&mut self, angle_deg: f64, duration_s: f64) {
        self.target_rad = norm_pi(angle_deg.to_radians());

        self.rate_rads = if duration_s > 0.0 {
            Some((self.target_rad - self.angle_rad).abs() / duration_s)
        } else {
            None
        };

        debug!(
            "Lift target set to {:.3} rad (rate {:?} rad/s)",
            self.target_rad, self.rate_rads
        );
    }

    pub fn raise(&mut self, duration_s: f64) {
        self.set_target(LIFT_RAISED_DEG, duration_s);
    }

    pub fn lower(&mut self, duration_s: f64) {
        self.set_target(LIFT_LOWERED_DEG, duration_s);
    }

    /// Move the lift towards its target, never overshooting it.
    pub fn step(&mut self, dt_s: f64) {
        let max_step_rad = match self.rate_rads {
            Some(r) => r * dt_s,
            None => {
                self.angle_rad = self.target_rad;
                return;
            }
        };

        if self.angle_rad < self.target_rad {
            self.angle_rad = (self.angle_rad + max_step_rad).min(self.target_rad);
        } else if self.angle_rad > self.target_rad {
            self.angle_rad = (self.angle_rad - max_step_rad).max(self.target_rad);
        }

        self.angle_rad = norm_pi(self.angle_rad);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_lower_raise() {
        let mut lift = Lift::new(PI / 2.0);
        assert!(!lift.is_moving());

        // Lowering by 90 degrees over 1 s at 0.05 s steps takes 20 steps
        lift.lower(1.0);
        assert!((lift.target_rad() - PI).abs() < 1e-12);

        for _ in 0..10 {
            lift.step(0.05);
        }
        assert!((lift.angle_rad() - 3.0 * PI / 4.0).abs() < 1e-9);
        assert!(lift.is_moving());

        for _ in 0..11 {
            lift.step(0.05);
        }
        assert_eq!(lift.angle_rad(), lift.target_rad());
        assert!(!lift.is_moving());

        lift.raise(2.0);
        for _ in 0..50 {
            lift.step(0.05);
        }
        assert!((lift.angle_rad() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_snap() {
        let mut lift = Lift::new(0.0);
        lift.set_target(-45.0, 0.0);
        lift.step(0.05);
        assert!((lift.angle_rad() + PI / 4.0).abs() < 1e-12);

        lift.set_target(30.0, -1.0);
        lift.step(0.05);
        assert!((lift.angle_rad() - PI / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_normalised() {
        let mut lift = Lift::new(0.0);
        lift.set_target(270.0, 1.0);
        assert!((lift.target_rad() + PI / 2.0).abs() < 1e-12);

        lift.set_target(-180.0, 1.0);
        assert!((lift.target_rad() - PI).abs() < 1e-12);
    }
}
