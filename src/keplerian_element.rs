//! # Keplerian orbital elements
//!
//! This module defines the [`KeplerianElements`] struct holding the
//! **classical orbital element set** `(a, e, i, Ω, ω, ν)` produced by the
//! Cartesian-to-Keplerian conversion, and the [`OrbitRegime`] tag that
//! selects the anomaly formulation valid for a given eccentricity.
//!
//! ## Regimes
//!
//! The eccentric-anomaly machinery of Kepler's equation only exists for
//! elliptic orbits, and its hyperbolic analog only for `e > 1`. Rather than
//! leaving that branch selection implicit, every element set carries an
//! explicit [`OrbitRegime`] derived from its eccentricity:
//!
//! - [`OrbitRegime::Elliptic`] — `e < 1 − tol`, finite `a > 0`
//! - [`OrbitRegime::Hyperbolic`] — `e > 1 + tol`, `a < 0`
//! - [`OrbitRegime::Parabolic`] — `|e − 1| ≤ tol`, `a` undefined
//!   (the semi-latus rectum `p` stays finite and is stored alongside `a`)
//!
//! Code that needs the anomaly matches on the regime and cannot silently
//! reuse the elliptic iteration outside its domain.
//!
//! ## Units
//!
//! - Lengths: **meters**
//! - Angles: **radians**
//!
//! ## Degeneracies
//!
//! Classical elements are singular for circular and equatorial orbits; the
//! conventions applied by the converter (`ω = 0`, `Ω = 0` respectively) are
//! documented in [`crate::orb_elem`].

use std::fmt;

use crate::apsis_errors::ApsisError;
use crate::constants::{Meter, Radian, Second, DPI, ECC_PARABOLIC_TOL};

/// Orbit regime tag, selected explicitly by eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitRegime {
    /// `e < 1`: closed orbit, eccentric anomaly defined.
    Elliptic,
    /// `e ≈ 1`: open orbit with undefined semi-major axis.
    Parabolic,
    /// `e > 1`: open orbit, hyperbolic anomaly defined.
    Hyperbolic,
}

impl OrbitRegime {
    /// Classify an eccentricity into a regime.
    ///
    /// The parabolic band is `|e − 1| < `[`ECC_PARABOLIC_TOL`]: orbits that
    /// close or open this near the escape boundary cannot be told apart
    /// numerically and are handled by the same (rejecting) path.
    pub fn classify(eccentricity: f64) -> Self {
        if (eccentricity - 1.0).abs() < ECC_PARABOLIC_TOL {
            OrbitRegime::Parabolic
        } else if eccentricity < 1.0 {
            OrbitRegime::Elliptic
        } else {
            OrbitRegime::Hyperbolic
        }
    }
}

/// Classical Keplerian elements (osculating, two-body), SI units.
///
/// The element set describes the orbit at the single epoch its true anomaly
/// refers to; it is derived from a Cartesian state and never persisted
/// independently of that epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerianElements {
    /// Semi-major axis `a` (m). Positive for elliptic orbits, negative for
    /// hyperbolic ones, and meaningless (±∞) for parabolic orbits — use
    /// [`semi_latus_rectum`](Self::semi_latus_rectum) there instead.
    pub semi_major_axis: Meter,
    /// Semi-latus rectum `p = h²/μ` (m). Finite for every orbit with a
    /// defined orbital plane.
    pub semi_latus_rectum: Meter,
    /// Eccentricity `e` (unitless, ≥ 0).
    pub eccentricity: f64,
    /// Inclination `i` (rad), in `[0, π]`.
    pub inclination: Radian,
    /// Longitude of the ascending node `Ω` (rad). Zero by convention for
    /// equatorial orbits.
    pub ascending_node_longitude: Radian,
    /// Argument of periapsis `ω` (rad). Zero by convention for circular
    /// orbits.
    pub periapsis_argument: Radian,
    /// True anomaly `ν` (rad); for circular orbits the argument of latitude
    /// (or true longitude when also equatorial).
    pub true_anomaly: Radian,
}

impl KeplerianElements {
    /// Orbit regime derived from the stored eccentricity.
    pub fn regime(&self) -> OrbitRegime {
        OrbitRegime::classify(self.eccentricity)
    }

    /// Mean motion `n` (rad/s): `√(μ/a³)` for elliptic orbits and
    /// `√(μ/(−a)³)` for hyperbolic ones.
    ///
    /// Fails with a degenerate-orbit error in the parabolic regime, where
    /// no finite semi-major axis exists.
    pub fn mean_motion(&self, mu: f64) -> Result<f64, ApsisError> {
        match self.regime() {
            OrbitRegime::Elliptic => Ok((mu / self.semi_major_axis.powi(3)).sqrt()),
            OrbitRegime::Hyperbolic => Ok((mu / (-self.semi_major_axis).powi(3)).sqrt()),
            OrbitRegime::Parabolic => Err(ApsisError::DegenerateOrbit(
                "mean motion is undefined for a parabolic orbit (no finite semi-major axis)"
                    .into(),
            )),
        }
    }

    /// Orbital period `T = 2π √(a³/μ)` (s), defined for elliptic orbits only.
    pub fn orbital_period(&self, mu: f64) -> Option<Second> {
        match self.regime() {
            OrbitRegime::Elliptic => Some(DPI * (self.semi_major_axis.powi(3) / mu).sqrt()),
            _ => None,
        }
    }

    /// Copy of these elements at a different true anomaly, all other
    /// elements unchanged. This is how the propagator advances an orbit:
    /// only the anomaly moves in unperturbed two-body motion.
    pub fn with_true_anomaly(&self, true_anomaly: Radian) -> Self {
        Self {
            true_anomaly,
            ..self.clone()
        }
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(f, "Keplerian Elements")?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(f, "  a   (semi-major axis)       = {:.3} m", self.semi_major_axis)?;
        writeln!(f, "  p   (semi-latus rectum)     = {:.3} m", self.semi_latus_rectum)?;
        writeln!(f, "  e   (eccentricity)          = {:.9}", self.eccentricity)?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        write!(
            f,
            "  ν   (true anomaly)          = {:.6} rad ({:.6}°)",
            self.true_anomaly,
            self.true_anomaly * rad_to_deg
        )
    }
}

#[cfg(test)]
mod keplerian_element_test {
    use super::*;
    use crate::constants::EARTH_GRAV_PARAM;
    use approx::assert_relative_eq;

    #[test]
    fn test_regime_classification() {
        assert_eq!(OrbitRegime::classify(0.0), OrbitRegime::Elliptic);
        assert_eq!(OrbitRegime::classify(0.999), OrbitRegime::Elliptic);
        assert_eq!(OrbitRegime::classify(1.0), OrbitRegime::Parabolic);
        assert_eq!(OrbitRegime::classify(1.0 - 1e-12), OrbitRegime::Parabolic);
        assert_eq!(OrbitRegime::classify(1.0 + 1e-12), OrbitRegime::Parabolic);
        assert_eq!(OrbitRegime::classify(1.5), OrbitRegime::Hyperbolic);
    }

    fn elements(a: f64, e: f64) -> KeplerianElements {
        KeplerianElements {
            semi_major_axis: a,
            semi_latus_rectum: if OrbitRegime::classify(e) == OrbitRegime::Parabolic {
                2.0 * a.abs()
            } else {
                a * (1.0 - e * e)
            },
            eccentricity: e,
            inclination: 0.3,
            ascending_node_longitude: 0.1,
            periapsis_argument: 0.2,
            true_anomaly: 0.0,
        }
    }

    #[test]
    fn test_mean_motion_and_period() {
        let kep = elements(7.5e6, 0.1);
        let n = kep.mean_motion(EARTH_GRAV_PARAM).unwrap();
        assert_relative_eq!(n, (EARTH_GRAV_PARAM / 7.5e6f64.powi(3)).sqrt());

        let period = kep.orbital_period(EARTH_GRAV_PARAM).unwrap();
        assert_relative_eq!(period, DPI / n, max_relative = 1e-14);

        let hyp = elements(-7.5e6, 1.5);
        let n_hyp = hyp.mean_motion(EARTH_GRAV_PARAM).unwrap();
        assert_relative_eq!(n_hyp, (EARTH_GRAV_PARAM / 7.5e6f64.powi(3)).sqrt());
        assert!(hyp.orbital_period(EARTH_GRAV_PARAM).is_none());
    }

    #[test]
    fn test_parabolic_mean_motion_is_degenerate() {
        let par = elements(f64::INFINITY, 1.0);
        assert!(matches!(
            par.mean_motion(EARTH_GRAV_PARAM),
            Err(ApsisError::DegenerateOrbit(_))
        ));
        assert!(par.orbital_period(EARTH_GRAV_PARAM).is_none());
    }
}
