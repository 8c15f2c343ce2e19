//! # Kepler's equation and anomaly conversions
//!
//! This module hosts the [`KeplerSolver`], a Newton-Raphson root finder
//! inverting Kepler's equation, together with the anomaly conversions used
//! to move between the mean, eccentric/hyperbolic, and true anomalies.
//!
//! ## Branch selection
//!
//! Kepler's equation takes a different form in each orbit regime:
//!
//! - **Elliptic** (`e < 1`): `M = E − e·sin E`, solved for the eccentric
//!   anomaly `E`.
//! - **Hyperbolic** (`e > 1`): `M = e·sinh H − H`, solved for the
//!   hyperbolic anomaly `H`.
//! - **Parabolic** (`e ≈ 1`): neither anomaly exists. The solver rejects
//!   the parabolic band with a degenerate-orbit error instead of running an
//!   iteration whose equation does not hold there.
//!
//! [`KeplerSolver::solve`] dispatches on [`OrbitRegime`] so the branch
//! choice is explicit and checked, never inferred by the caller.

use std::f64::consts::PI;

use crate::apsis_errors::ApsisError;
use crate::constants::{Radian, DPI};
use crate::keplerian_element::OrbitRegime;

/// Seed threshold: below this eccentricity `E₀ = M` converges quickly, above
/// it the iteration starts from `E₀ = π` to stay clear of the shallow-slope
/// region near periapsis.
const HIGH_ECC_GUESS_THRESHOLD: f64 = 0.8;

/// Return the principal value of an angle in `[0, 2π)`.
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}

/// Solved anomaly, tagged by the regime it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anomaly {
    /// Eccentric anomaly `E` of an elliptic orbit (rad).
    Eccentric(Radian),
    /// Hyperbolic anomaly `H` of a hyperbolic orbit (rad).
    Hyperbolic(Radian),
}

impl Anomaly {
    /// Convert the solved anomaly to the true anomaly of its orbit.
    pub fn to_true(self, eccentricity: f64) -> Radian {
        match self {
            Anomaly::Eccentric(e_anom) => eccentric_to_true(e_anom, eccentricity),
            Anomaly::Hyperbolic(h_anom) => hyperbolic_to_true(h_anom, eccentricity),
        }
    }
}

/// Newton-Raphson solver for Kepler's equation.
///
/// Tolerance applies to the anomaly correction `|ΔE|` (rad); the iteration
/// cap bounds every solve — a non-converging iteration always terminates
/// with a convergence error, never an infinite loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    tolerance: f64,
    max_iterations: usize,
}

impl KeplerSolver {
    /// Build a solver from a caller-supplied tolerance (rad) and iteration
    /// cap; both must be strictly positive.
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<Self, ApsisError> {
        if !(tolerance > 0.0) {
            return Err(ApsisError::Configuration(format!(
                "solver tolerance must be strictly positive, got {tolerance}"
            )));
        }
        if max_iterations == 0 {
            return Err(ApsisError::Configuration(
                "solver iteration cap must be strictly positive".into(),
            ));
        }
        Ok(Self {
            tolerance,
            max_iterations,
        })
    }

    /// Solve Kepler's equation for the anomaly matching the orbit regime.
    ///
    /// Dispatches on [`OrbitRegime::classify`]: elliptic input yields an
    /// [`Anomaly::Eccentric`], hyperbolic an [`Anomaly::Hyperbolic`], and
    /// the parabolic band a degenerate-orbit error (Barker's equation is
    /// deliberately not provided; see the propagation policy).
    pub fn solve(&self, mean_anomaly: Radian, eccentricity: f64) -> Result<Anomaly, ApsisError> {
        match OrbitRegime::classify(eccentricity) {
            OrbitRegime::Elliptic => self
                .solve_elliptic(mean_anomaly, eccentricity)
                .map(|(e_anom, _)| Anomaly::Eccentric(e_anom)),
            OrbitRegime::Hyperbolic => self
                .solve_hyperbolic(mean_anomaly, eccentricity)
                .map(|(h_anom, _)| Anomaly::Hyperbolic(h_anom)),
            OrbitRegime::Parabolic => Err(ApsisError::DegenerateOrbit(format!(
                "parabolic orbit (e = {eccentricity}): Kepler's equation has no \
                 eccentric anomaly at e = 1"
            ))),
        }
    }

    /// Solve the elliptic Kepler equation `M = E − e·sin E` for `E`.
    ///
    /// Returns the eccentric anomaly in `[0, 2π)` and the number of Newton
    /// iterations spent. For `e = 0` the equation is the identity and the
    /// first iteration lands exactly (`E = M`).
    pub fn solve_elliptic(
        &self,
        mean_anomaly: Radian,
        eccentricity: f64,
    ) -> Result<(Radian, usize), ApsisError> {
        let m = principal_angle(mean_anomaly);
        let mut e_anom = if eccentricity < HIGH_ECC_GUESS_THRESHOLD {
            m
        } else {
            PI
        };

        let mut correction = f64::MAX;
        for iteration in 1..=self.max_iterations {
            correction = (e_anom - eccentricity * e_anom.sin() - m)
                / (1.0 - eccentricity * e_anom.cos());
            e_anom -= correction;
            if correction.abs() < self.tolerance {
                return Ok((principal_angle(e_anom), iteration));
            }
        }

        Err(ApsisError::Convergence {
            iterations: self.max_iterations,
            last_correction: correction,
            tolerance: self.tolerance,
        })
    }

    /// Solve the hyperbolic Kepler equation `M = e·sinh H − H` for `H`.
    ///
    /// The mean anomaly is unbounded on a hyperbola, so no angle reduction
    /// is applied; the iteration is seeded with `asinh(M/e)`, exact in the
    /// large-|M| limit.
    pub fn solve_hyperbolic(
        &self,
        mean_anomaly: Radian,
        eccentricity: f64,
    ) -> Result<(Radian, usize), ApsisError> {
        let m = mean_anomaly;
        let mut h_anom = (m / eccentricity).asinh();

        let mut correction = f64::MAX;
        for iteration in 1..=self.max_iterations {
            correction = (eccentricity * h_anom.sinh() - h_anom - m)
                / (eccentricity * h_anom.cosh() - 1.0);
            h_anom -= correction;
            if correction.abs() < self.tolerance {
                return Ok((h_anom, iteration));
            }
        }

        Err(ApsisError::Convergence {
            iterations: self.max_iterations,
            last_correction: correction,
            tolerance: self.tolerance,
        })
    }
}

// -------------------------------------------------------------------------------------------------
// Anomaly conversions
// -------------------------------------------------------------------------------------------------

/// True anomaly from eccentric anomaly (elliptic):
/// `tan(ν/2) = √((1+e)/(1−e))·tan(E/2)`, evaluated in the atan2 form
/// `ν = 2·atan2(√(1+e)·sin(E/2), √(1−e)·cos(E/2))` which stays finite at
/// `E = π`.
pub fn eccentric_to_true(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = eccentric_anomaly / 2.0;
    principal_angle(
        2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
            .atan2((1.0 - eccentricity).sqrt() * half.cos()),
    )
}

/// Eccentric anomaly from true anomaly (elliptic), inverse half-angle form.
pub fn true_to_eccentric(true_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = true_anomaly / 2.0;
    principal_angle(
        2.0 * ((1.0 - eccentricity).sqrt() * half.sin())
            .atan2((1.0 + eccentricity).sqrt() * half.cos()),
    )
}

/// Mean anomaly from eccentric anomaly (elliptic Kepler equation forward).
pub fn eccentric_to_mean(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    principal_angle(eccentric_anomaly - eccentricity * eccentric_anomaly.sin())
}

/// True anomaly from hyperbolic anomaly:
/// `tanh(H/2) = √((e−1)/(e+1))·tan(ν/2)`.
pub fn hyperbolic_to_true(hyperbolic_anomaly: Radian, eccentricity: f64) -> Radian {
    let factor = ((eccentricity + 1.0) / (eccentricity - 1.0)).sqrt();
    2.0 * (factor * (hyperbolic_anomaly / 2.0).tanh()).atan()
}

/// Hyperbolic anomaly from true anomaly.
pub fn true_to_hyperbolic(true_anomaly: Radian, eccentricity: f64) -> Radian {
    let factor = ((eccentricity - 1.0) / (eccentricity + 1.0)).sqrt();
    2.0 * (factor * (true_anomaly / 2.0).tan()).atanh()
}

/// Mean anomaly from hyperbolic anomaly (hyperbolic Kepler equation forward).
pub fn hyperbolic_to_mean(hyperbolic_anomaly: Radian, eccentricity: f64) -> Radian {
    eccentricity * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn solver() -> KeplerSolver {
        KeplerSolver::new(1e-12, 50).unwrap()
    }

    #[test]
    fn test_elliptic_residual() {
        for &(m, e) in &[(1.0, 0.1), (0.5, 0.5), (5.8, 0.3), (2.0, 0.95)] {
            let (e_anom, _) = solver().solve_elliptic(m, e).unwrap();
            assert_abs_diff_eq!(
                principal_angle(e_anom - e * e_anom.sin()),
                principal_angle(m),
                epsilon = 1e-11
            );
        }
    }

    #[test]
    fn test_circular_converges_in_one_iteration() {
        let (e_anom, iterations) = solver().solve_elliptic(1.2345, 0.0).unwrap();
        assert_eq!(iterations, 1);
        assert_eq!(e_anom, 1.2345);
    }

    #[test]
    fn test_hyperbolic_residual() {
        for &(m, e) in &[(2.0, 1.5), (-3.0, 2.5), (40.0, 1.1)] {
            let (h_anom, _) = solver().solve_hyperbolic(m, e).unwrap();
            assert_relative_eq!(e * h_anom.sinh() - h_anom, m, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_parabolic_is_rejected() {
        assert!(matches!(
            solver().solve(1.0, 1.0),
            Err(ApsisError::DegenerateOrbit(_))
        ));
        // Near-parabolic falls in the same band.
        assert!(matches!(
            solver().solve(1.0, 1.0 + 1e-10),
            Err(ApsisError::DegenerateOrbit(_))
        ));
    }

    #[test]
    fn test_regime_dispatch() {
        assert!(matches!(
            solver().solve(1.0, 0.3),
            Ok(Anomaly::Eccentric(_))
        ));
        assert!(matches!(
            solver().solve(1.0, 1.3),
            Ok(Anomaly::Hyperbolic(_))
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let strict = KeplerSolver::new(1e-15, 1).unwrap();
        let result = strict.solve_elliptic(0.1, 0.9);
        assert!(matches!(
            result,
            Err(ApsisError::Convergence { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_solver_parameters() {
        assert!(KeplerSolver::new(0.0, 50).is_err());
        assert!(KeplerSolver::new(-1e-9, 50).is_err());
        assert!(KeplerSolver::new(1e-12, 0).is_err());
    }

    #[test]
    fn test_anomaly_round_trips() {
        let e = 0.4;
        for &nu in &[0.0, 0.7, 2.5, 4.0, 6.0] {
            let e_anom = true_to_eccentric(nu, e);
            assert_abs_diff_eq!(eccentric_to_true(e_anom, e), principal_angle(nu), epsilon = 1e-12);
        }

        let e_hyp = 1.8;
        for &nu in &[-1.0, -0.3, 0.0, 0.5, 1.2] {
            let h_anom = true_to_hyperbolic(nu, e_hyp);
            assert_abs_diff_eq!(hyperbolic_to_true(h_anom, e_hyp), nu, epsilon = 1e-12);
        }
    }
}
