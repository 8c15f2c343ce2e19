use std::fmt;
use std::sync::Arc;

use crate::apsis_errors::ApsisError;

/// Central attracting body: an identity plus a gravitational parameter
/// `μ = G·M` (m³/s²).
///
/// Immutable for the duration of a propagation run and shared by reference
/// (`Arc`) across every tracked body that orbits it; concurrent reads need
/// no locking.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralBody {
    pub name: String,
    /// Gravitational parameter `μ` (m³/s²), strictly positive.
    pub gravitational_parameter: f64,
}

impl CentralBody {
    /// Build a central body, validating `μ > 0`.
    pub fn new(
        name: impl Into<String>,
        gravitational_parameter: f64,
    ) -> Result<Arc<Self>, ApsisError> {
        if !(gravitational_parameter > 0.0) {
            return Err(ApsisError::Configuration(format!(
                "gravitational parameter must be strictly positive, got {gravitational_parameter}"
            )));
        }
        Ok(Arc::new(Self {
            name: name.into(),
            gravitational_parameter,
        }))
    }
}

impl fmt::Display for CentralBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (μ = {:.6e} m³/s²)",
            self.name, self.gravitational_parameter
        )
    }
}
