//! # Constants and type definitions for Apsis
//!
//! This module centralizes the **physical constants**, **numerical tolerances**, and **common type
//! definitions** used throughout the `apsis` library.
//!
//! ## Overview
//!
//! - Physical constants (gravitational parameters, time conversions)
//! - Numerical tolerances governing orbit-regime classification
//! - Core type aliases used across the crate, including the propagation
//!   history container
//!
//! All quantities are expressed in **SI units** (meters, seconds, radians).
//! Any kilometer or other-unit conversion is the caller's responsibility.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::cartesian::CartesianState;

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Gravitational parameter of the Earth (m³/s²)
pub const EARTH_GRAV_PARAM: f64 = 3.986004415e14;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Eccentricity band around `e = 1` treated as parabolic.
///
/// Orbits falling inside this band have no finite semi-major axis and no
/// eccentric/hyperbolic anomaly; the propagator rejects them with a
/// degenerate-orbit error rather than running the elliptic iteration
/// outside its domain.
pub const ECC_PARABOLIC_TOL: f64 = 1e-8;

/// Eccentricity below which an orbit is treated as circular.
///
/// Below this threshold the argument of periapsis is undefined; the
/// converter pins `ω = 0` and references the anomaly to the ascending node
/// (argument of latitude) or to the x-axis when the orbit is also
/// equatorial (true longitude).
pub const ECC_CIRCULAR_TOL: f64 = 1e-11;

/// Relative node-vector magnitude (|n| / |h|) below which an orbit is
/// treated as equatorial and `Ω` is pinned to zero.
pub const NODE_EQUATORIAL_TOL: f64 = 1e-11;

/// Relative angular-momentum magnitude (|h| / (|r|·|v|)) below which an
/// orbit is rectilinear: the orbital plane is undefined and conversion to
/// Keplerian elements fails.
pub const ANGMOM_RECTILINEAR_TOL: f64 = 1e-11;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Length in meters
pub type Meter = f64;

/// Velocity in meters per second
pub type MeterPerSecond = f64;

/// Elapsed time in seconds
pub type Second = f64;

/// Angle in radians
pub type Radian = f64;

/// Time-ordered propagation output of a single tracked body.
///
/// Maps elapsed seconds (strictly increasing, exact multiples of the
/// configured output interval offset from the interval start) to the
/// Cartesian state sampled at that instant.
pub type PropagationHistory = BTreeMap<OrderedFloat<Second>, CartesianState>;
