//! # Body registry
//!
//! Arena of tracked bodies. Bodies are stored by value and addressed by a
//! small stable [`BodyId`] index; nothing in the crate holds a pointer to a
//! body, so per-body propagation can proceed concurrently with each task
//! touching only its own entry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::apsis_errors::ApsisError;
use crate::bodies::central_body::CentralBody;
use crate::cartesian::CartesianState;

/// Stable index of a tracked body inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub(crate) u16);

/// A body tracked by the propagator: identifier, central-body reference,
/// and the initial Cartesian state at the start of the propagation
/// interval.
///
/// Both the central body and the initial state must be set before a run;
/// the engine validates this and names offending bodies.
#[derive(Debug, Clone)]
pub struct TrackedBody {
    pub name: String,
    pub(crate) central_body: Option<Arc<CentralBody>>,
    pub(crate) initial_state: Option<CartesianState>,
}

impl TrackedBody {
    pub fn central_body(&self) -> Option<&Arc<CentralBody>> {
        self.central_body.as_ref()
    }

    pub fn initial_state(&self) -> Option<&CartesianState> {
        self.initial_state.as_ref()
    }

    /// A body is ready to propagate once both its central body and initial
    /// state are set.
    pub fn is_configured(&self) -> bool {
        self.central_body.is_some() && self.initial_state.is_some()
    }
}

/// Registry of tracked bodies, indexed by [`BodyId`] with a name → id map
/// for idempotent registration.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<TrackedBody>,
    index: HashMap<String, BodyId>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body under `name`, returning its id. Idempotent: adding
    /// an already-registered name returns the existing id untouched.
    pub fn add_body(&mut self, name: &str) -> BodyId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = BodyId(self.bodies.len() as u16);
        self.bodies.push(TrackedBody {
            name: name.to_string(),
            central_body: None,
            initial_state: None,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Set (or replace) the central body of a tracked body.
    pub fn set_central_body(
        &mut self,
        id: BodyId,
        central_body: Arc<CentralBody>,
    ) -> Result<(), ApsisError> {
        self.body_mut(id)?.central_body = Some(central_body);
        Ok(())
    }

    /// Set (or replace) the initial Cartesian state of a tracked body.
    pub fn set_initial_state(
        &mut self,
        id: BodyId,
        state: CartesianState,
    ) -> Result<(), ApsisError> {
        self.body_mut(id)?.initial_state = Some(state);
        Ok(())
    }

    /// Look up a body id by name.
    pub fn id_of(&self, name: &str) -> Option<BodyId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: BodyId) -> Option<&TrackedBody> {
        self.bodies.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &TrackedBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (BodyId(i as u16), body))
    }

    /// Names of every body still missing a central body or an initial
    /// state. An empty result means the registry is ready to propagate.
    pub fn missing_configuration(&self) -> Vec<&str> {
        self.bodies
            .iter()
            .filter(|body| !body.is_configured())
            .map(|body| body.name.as_str())
            .collect()
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut TrackedBody, ApsisError> {
        self.bodies
            .get_mut(id.0 as usize)
            .ok_or_else(|| ApsisError::OutOfRange(format!("unknown body id {}", id.0)))
    }
}
