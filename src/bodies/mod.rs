//! # Tracked bodies and their registry
//!
//! - [`central_body`](crate::bodies::central_body) — the attracting body
//!   (identity + gravitational parameter), shared by reference across every
//!   satellite that orbits it.
//! - [`registry`](crate::bodies::registry) — arena of tracked bodies,
//!   addressed by small stable [`BodyId`](crate::bodies::registry::BodyId)
//!   indices.

pub mod central_body;
pub mod registry;

pub use central_body::CentralBody;
pub use registry::{BodyId, BodyRegistry, TrackedBody};
