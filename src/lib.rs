//! # Apsis: analytic two-body orbit propagation
//!
//! `apsis` propagates satellites around a central body by **closed-form
//! Keplerian motion**: an initial Cartesian state is converted once to
//! orbital elements, the mean anomaly is advanced analytically to each
//! output instant, Kepler's equation is inverted by Newton-Raphson, and the
//! elements are rotated back to a Cartesian state. No numerical integration
//! is involved, and no perturbations are modeled — motion is exactly
//! two-body.
//!
//! ## Core components
//!
//! - [`orb_elem`] — bidirectional Cartesian ⇄ Keplerian conversion with an
//!   explicit degenerate-case policy.
//! - [`kepler`] — Newton-Raphson inversion of Kepler's equation, with
//!   separate elliptic and hyperbolic branches selected by orbit regime.
//! - [`bodies`] — central bodies and the registry of tracked bodies.
//! - [`propagator`] — the engine tying it together: configuration, fixed
//!   output sampling, per-body parallel propagation, and partial-failure
//!   semantics.
//!
//! ## Units
//!
//! Everything is SI: meters, meters per second, seconds, radians. Unit
//! conversion is the caller's concern.
//!
//! ## Example
//!
//! ```rust
//! use apsis::bodies::CentralBody;
//! use apsis::cartesian::CartesianState;
//! use apsis::constants::EARTH_GRAV_PARAM;
//! use apsis::propagator::{KeplerPropagator, PropagationConfig};
//!
//! let earth = CentralBody::new("Earth", EARTH_GRAV_PARAM).unwrap();
//!
//! let mut propagator = KeplerPropagator::new();
//! let satellite = propagator.add_body("asterix");
//! propagator.set_central_body(satellite, earth).unwrap();
//! propagator
//!     .set_initial_state(
//!         satellite,
//!         CartesianState::from_components(6.75e6, 0.0, 0.0, 0.0, 8_059.5973215, 0.0),
//!     )
//!     .unwrap();
//!
//! propagator
//!     .configure(PropagationConfig::new(0.0, 86_400.0, 3_600.0, 1e-12, 50).unwrap())
//!     .unwrap();
//! propagator.propagate().unwrap();
//!
//! let history = propagator.history(satellite).unwrap();
//! assert_eq!(history.len(), 25);
//! ```

pub mod apsis_errors;
pub mod bodies;
pub mod cartesian;
pub mod constants;
pub mod kepler;
pub mod keplerian_element;
pub mod orb_elem;
pub mod propagator;
