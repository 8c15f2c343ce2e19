//! # Cartesian state vectors
//!
//! This module defines [`CartesianState`], the six-component position/velocity
//! representation consumed and produced by the propagation core, together
//! with the conserved-quantity helpers (specific orbital energy, specific
//! angular momentum) used to check the physical consistency of a
//! propagation run.
//!
//! ## Units
//!
//! - Position: **meters**
//! - Velocity: **meters per second**
//!
//! Unit conversion from kilometers (or anything else) happens strictly at
//! the caller boundary, never inside the core.

use std::fmt;

use nalgebra::Vector3;

use crate::constants::{Meter, MeterPerSecond};

/// Cartesian state of a body: position and velocity in an inertial frame,
/// SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianState {
    /// Position vector (m).
    pub position: Vector3<Meter>,
    /// Velocity vector (m/s).
    pub velocity: Vector3<MeterPerSecond>,
}

impl CartesianState {
    pub fn new(position: Vector3<Meter>, velocity: Vector3<MeterPerSecond>) -> Self {
        Self { position, velocity }
    }

    /// Build a state from its six scalar components `(x, y, z, vx, vy, vz)`.
    pub fn from_components(
        x: Meter,
        y: Meter,
        z: Meter,
        vx: MeterPerSecond,
        vy: MeterPerSecond,
        vz: MeterPerSecond,
    ) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(vx, vy, vz),
        }
    }

    /// Distance to the central body (m).
    pub fn radius(&self) -> Meter {
        self.position.norm()
    }

    /// Magnitude of the velocity (m/s).
    pub fn speed(&self) -> MeterPerSecond {
        self.velocity.norm()
    }

    /// Specific angular momentum vector `h = r × v` (m²/s).
    ///
    /// Constant along an unperturbed two-body trajectory.
    pub fn specific_angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Specific orbital energy `ξ = v²/2 − μ/r` (m²/s²).
    ///
    /// Negative for bound (elliptic) orbits, zero for parabolic, positive
    /// for hyperbolic. Constant along an unperturbed two-body trajectory.
    pub fn specific_energy(&self, mu: f64) -> f64 {
        self.velocity.norm_squared() / 2.0 - mu / self.radius()
    }
}

impl fmt::Display for CartesianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  r = [{:.3}, {:.3}, {:.3}] m",
            self.position.x, self.position.y, self.position.z
        )?;
        write!(
            f,
            "  v = [{:.6}, {:.6}, {:.6}] m/s",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}

#[cfg(test)]
mod cartesian_test {
    use super::*;
    use crate::constants::EARTH_GRAV_PARAM;
    use approx::assert_relative_eq;

    #[test]
    fn test_conserved_quantity_helpers() {
        // Circular orbit at r = 7000 km: v = sqrt(mu / r), h = r v, xi = -mu / 2r.
        let r = 7.0e6;
        let v = (EARTH_GRAV_PARAM / r).sqrt();
        let state = CartesianState::from_components(r, 0.0, 0.0, 0.0, v, 0.0);

        assert_relative_eq!(state.radius(), r);
        assert_relative_eq!(state.speed(), v);
        assert_relative_eq!(state.specific_angular_momentum().norm(), r * v);
        assert_relative_eq!(
            state.specific_energy(EARTH_GRAV_PARAM),
            -EARTH_GRAV_PARAM / (2.0 * r),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_angular_momentum_direction() {
        let state = CartesianState::from_components(7.0e6, 0.0, 0.0, 0.0, 7.5e3, 0.0);
        let h = state.specific_angular_momentum();
        assert_eq!(h.x, 0.0);
        assert_eq!(h.y, 0.0);
        assert!(h.z > 0.0);
    }
}
