//! # Cartesian ⇄ Keplerian conversion
//!
//! Bidirectional transform between a Cartesian state vector and the
//! classical Keplerian element set, built from the specific angular
//! momentum vector `h = r × v`, the eccentricity vector, and the node
//! vector `n = ẑ × h`.
//!
//! ## Degenerate-case policy
//!
//! Classical elements are singular in three places; the policy is explicit
//! rather than silently wrong:
//!
//! - **Circular** (`e < `[`ECC_CIRCULAR_TOL`]): `ω` is undefined and pinned
//!   to `0`; the anomaly is referenced to the ascending node (argument of
//!   latitude), or to the inertial x-axis when the orbit is also equatorial
//!   (true longitude).
//! - **Equatorial** (`|n|/|h| < `[`NODE_EQUATORIAL_TOL`]): `Ω` is undefined
//!   and pinned to `0`; `ω` becomes the longitude of periapsis, measured in
//!   the orbit's direction of motion so that the inverse transform is still
//!   exact for retrograde orbits.
//! - **Rectilinear** (`|h|/(|r|·|v|) < `[`ANGMOM_RECTILINEAR_TOL`]): no
//!   orbital plane exists; conversion fails with a degenerate-orbit error.
//!
//! The two transforms are exact algebraic inverses: a round trip through
//! [`cartesian_to_keplerian`] and [`keplerian_to_cartesian`] reproduces the
//! input state to machine precision for every non-degenerate orbit.

use nalgebra::{Rotation3, Vector3};

use crate::apsis_errors::ApsisError;
use crate::cartesian::CartesianState;
use crate::constants::{ANGMOM_RECTILINEAR_TOL, ECC_CIRCULAR_TOL, NODE_EQUATORIAL_TOL};
use crate::kepler::principal_angle;
use crate::keplerian_element::KeplerianElements;

/// Angle from `from` to `to`, measured in the plane orthogonal to `plane_normal`
/// and signed by the normal's orientation. Scale-invariant in both vectors.
fn in_plane_angle(from: &Vector3<f64>, to: &Vector3<f64>, plane_normal: &Vector3<f64>) -> f64 {
    from.cross(to).dot(plane_normal).atan2(from.dot(to) * plane_normal.norm())
}

/// Convert a Cartesian state to Keplerian elements for a central body of
/// gravitational parameter `mu` (m³/s²).
///
/// Fails with a degenerate-orbit error when the angular momentum vanishes
/// (rectilinear trajectory). Parabolic states convert fine — the returned
/// semi-major axis is ±∞ and the semi-latus rectum carries the geometry —
/// but they cannot be propagated (see [`crate::kepler::KeplerSolver::solve`]).
pub fn cartesian_to_keplerian(
    state: &CartesianState,
    mu: f64,
) -> Result<KeplerianElements, ApsisError> {
    let r = state.position;
    let v = state.velocity;
    let r_norm = r.norm();
    let v_norm = v.norm();

    if r_norm == 0.0 {
        return Err(ApsisError::DegenerateOrbit(
            "position vector is zero: state coincides with the central body".into(),
        ));
    }

    let h = r.cross(&v);
    let h_norm = h.norm();
    if h_norm <= ANGMOM_RECTILINEAR_TOL * r_norm * v_norm {
        return Err(ApsisError::DegenerateOrbit(format!(
            "rectilinear orbit (|h| = {h_norm:.3e} m²/s): no orbital plane is defined"
        )));
    }
    let h_unit = h / h_norm;

    // Node vector: intersection of the orbital plane with the reference plane.
    let node = Vector3::z().cross(&h);
    let node_norm = node.norm();
    let equatorial = node_norm < NODE_EQUATORIAL_TOL * h_norm;

    // Eccentricity vector, points to periapsis with magnitude e.
    let ecc_vec = v.cross(&h) / mu - r / r_norm;
    let eccentricity = ecc_vec.norm();
    let circular = eccentricity < ECC_CIRCULAR_TOL;

    let energy = state.specific_energy(mu);
    // ±∞ for a parabolic state; the semi-latus rectum below stays finite.
    let semi_major_axis = -mu / (2.0 * energy);
    let semi_latus_rectum = h_norm * h_norm / mu;

    let inclination = (h.z / h_norm).clamp(-1.0, 1.0).acos();

    let ascending_node_longitude = if equatorial {
        0.0
    } else {
        principal_angle(node.y.atan2(node.x))
    };

    // In-plane reference direction the angular elements are measured from:
    // the ascending node, or the inertial x-axis for equatorial orbits.
    let reference = if equatorial { Vector3::x() } else { node };

    let periapsis_argument = if circular {
        0.0
    } else {
        principal_angle(in_plane_angle(&reference, &ecc_vec, &h_unit))
    };

    let true_anomaly = if circular {
        // Argument of latitude (or true longitude when equatorial), with ω = 0.
        principal_angle(in_plane_angle(&reference, &r, &h_unit))
    } else {
        principal_angle(in_plane_angle(&ecc_vec, &r, &h_unit))
    };

    Ok(KeplerianElements {
        semi_major_axis,
        semi_latus_rectum,
        eccentricity,
        inclination,
        ascending_node_longitude,
        periapsis_argument,
        true_anomaly,
    })
}

/// Convert Keplerian elements back to a Cartesian state.
///
/// Builds the state in the perifocal frame from the conic equation
/// `r = p / (1 + e·cos ν)` and rotates it into the inertial frame with
/// `R₃(Ω)·R₁(i)·R₃(ω)`. Uses the semi-latus rectum throughout, so the
/// transform is defined for every regime with a finite `p`.
pub fn keplerian_to_cartesian(
    elements: &KeplerianElements,
    mu: f64,
) -> Result<CartesianState, ApsisError> {
    let p = elements.semi_latus_rectum;
    if !(p > 0.0) || !p.is_finite() {
        return Err(ApsisError::DegenerateOrbit(format!(
            "semi-latus rectum must be finite and positive, got {p}"
        )));
    }

    let e = elements.eccentricity;
    let nu = elements.true_anomaly;
    let denom = 1.0 + e * nu.cos();
    if denom <= 0.0 {
        // Only reachable for a hyperbolic ν outside the asymptote limits.
        return Err(ApsisError::OutOfRange(format!(
            "true anomaly {nu} rad lies beyond the hyperbolic asymptotes (e = {e})"
        )));
    }

    let radius = p / denom;
    let r_perifocal = Vector3::new(radius * nu.cos(), radius * nu.sin(), 0.0);
    let v_perifocal = (mu / p).sqrt() * Vector3::new(-nu.sin(), e + nu.cos(), 0.0);

    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), elements.ascending_node_longitude)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), elements.periapsis_argument);

    Ok(CartesianState::new(
        rotation * r_perifocal,
        rotation * v_perifocal,
    ))
}

#[cfg(test)]
mod orb_elem_test {
    use super::*;
    use crate::constants::EARTH_GRAV_PARAM;
    use approx::assert_relative_eq;

    const MU: f64 = EARTH_GRAV_PARAM;

    fn assert_states_close(a: &CartesianState, b: &CartesianState, max_relative: f64) {
        for i in 0..3 {
            assert_relative_eq!(
                a.position[i],
                b.position[i],
                max_relative = max_relative,
                epsilon = 1e-4
            );
            assert_relative_eq!(
                a.velocity[i],
                b.velocity[i],
                max_relative = max_relative,
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_round_trip_inclined_elliptic() {
        let state = CartesianState::from_components(
            6.2e6, 2.1e6, 1.3e6, -1.2e3, 6.8e3, 2.9e3,
        );
        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert!(elements.eccentricity < 1.0);
        assert!(elements.semi_major_axis > 0.0);

        let back = keplerian_to_cartesian(&elements, MU).unwrap();
        assert_states_close(&state, &back, 1e-9);
    }

    #[test]
    fn test_round_trip_hyperbolic() {
        // Well above escape speed at 6750 km.
        let state = CartesianState::from_components(6.75e6, 0.0, 1.0e6, 0.0, 1.3e4, 2.0e3);
        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert!(elements.eccentricity > 1.0);
        assert!(elements.semi_major_axis < 0.0);

        let back = keplerian_to_cartesian(&elements, MU).unwrap();
        assert_states_close(&state, &back, 1e-9);
    }

    #[test]
    fn test_round_trip_circular_inclined() {
        // Circular speed at 7000 km, plane tilted 45° about x.
        let r = 7.0e6;
        let v = (MU / r).sqrt();
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let state = CartesianState::from_components(r, 0.0, 0.0, 0.0, v * half, v * half);

        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert!(elements.eccentricity < 1e-10);
        assert_eq!(elements.periapsis_argument, 0.0);
        assert_relative_eq!(elements.inclination, std::f64::consts::FRAC_PI_4, max_relative = 1e-9);

        let back = keplerian_to_cartesian(&elements, MU).unwrap();
        assert_states_close(&state, &back, 1e-9);
    }

    #[test]
    fn test_round_trip_equatorial() {
        let state = CartesianState::from_components(6.9e6, -1.2e6, 0.0, 1.5e3, 7.6e3, 0.0);
        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert_eq!(elements.ascending_node_longitude, 0.0);
        assert!(elements.inclination.abs() < 1e-12);

        let back = keplerian_to_cartesian(&elements, MU).unwrap();
        assert_states_close(&state, &back, 1e-9);
    }

    #[test]
    fn test_round_trip_retrograde_equatorial() {
        // Same orbit geometry, motion reversed: i = π, node undefined.
        let state = CartesianState::from_components(6.9e6, -1.2e6, 0.0, -1.5e3, -7.6e3, 0.0);
        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert_eq!(elements.ascending_node_longitude, 0.0);
        assert_relative_eq!(elements.inclination, std::f64::consts::PI, max_relative = 1e-9);

        let back = keplerian_to_cartesian(&elements, MU).unwrap();
        assert_states_close(&state, &back, 1e-9);
    }

    #[test]
    fn test_rectilinear_is_degenerate() {
        // Velocity parallel to position: zero angular momentum.
        let state = CartesianState::from_components(7.0e6, 0.0, 0.0, 5.0e3, 0.0, 0.0);
        assert!(matches!(
            cartesian_to_keplerian(&state, MU),
            Err(ApsisError::DegenerateOrbit(_))
        ));

        let at_rest = CartesianState::from_components(7.0e6, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            cartesian_to_keplerian(&at_rest, MU),
            Err(ApsisError::DegenerateOrbit(_))
        ));
    }

    #[test]
    fn test_parabolic_elements_have_finite_semi_latus_rectum() {
        let r = 6.75e6;
        let v_escape = (2.0 * MU / r).sqrt();
        let state = CartesianState::from_components(r, 0.0, 0.0, 0.0, v_escape, 0.0);

        let elements = cartesian_to_keplerian(&state, MU).unwrap();
        assert_relative_eq!(elements.eccentricity, 1.0, max_relative = 1e-12);
        assert!(elements.semi_latus_rectum.is_finite());
        assert_relative_eq!(elements.semi_latus_rectum, 2.0 * r, max_relative = 1e-12);
    }

    #[test]
    fn test_reference_scenario_elements() {
        // Slightly eccentric LEO: a = 7.5e6 m, e = 0.1 by construction.
        let state =
            CartesianState::from_components(6.75e6, 0.0, 0.0, 0.0, 8_059.5973215, 0.0);
        let elements = cartesian_to_keplerian(&state, MU).unwrap();

        assert_relative_eq!(elements.semi_major_axis, 7.5e6, max_relative = 1e-4);
        assert_relative_eq!(elements.eccentricity, 0.1, max_relative = 1e-4);
        assert!(elements.inclination.abs() < 1e-12);
        // The state sits at periapsis: r = a(1 - e).
        assert!(elements.true_anomaly.abs() < 1e-6 || (elements.true_anomaly - crate::constants::DPI).abs() < 1e-6);
    }
}
