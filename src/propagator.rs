//! # Kepler propagation engine
//!
//! The [`KeplerPropagator`] orchestrates element conversion, analytic
//! time-stepping, and Kepler-equation solving across every registered body,
//! producing a time-indexed [`PropagationHistory`] per body.
//!
//! ## Lifecycle
//!
//! The engine moves through `Unconfigured → Configured → Propagated`:
//! bodies may be registered at any point, but [`propagate`](KeplerPropagator::propagate)
//! refuses to run before a valid [`PropagationConfig`] is installed, and a
//! run also refuses to start while any registered body is missing its
//! central body or initial state (configuration errors are fatal for the
//! whole run — nothing is propagated).
//!
//! ## Sampling policy
//!
//! Output instants are `t = interval_start + k·fixed_output_interval` for
//! `k = 0, 1, 2, …`. The last sample is the largest such `t ≤ interval_end`
//! (a slack of `1e-9·Δt` absorbs floating-point error in the division);
//! `interval_end` itself appears in the history only when it falls exactly
//! on a sample. The first sample stores the caller's initial state
//! verbatim.
//!
//! ## Failure policy
//!
//! Numerical failures (non-convergence, degenerate orbit) are local to the
//! body that produced them: its outcome is marked
//! [`Failed`](PropagationOutcome::Failed) with whatever partial history was
//! accumulated, a warning is logged, and the remaining bodies are
//! unaffected. No retries are attempted — the iteration cap is the retry
//! budget; the caller decides whether to reconfigure and re-run.
//!
//! Bodies are propagated in parallel: each trajectory depends only on its
//! own initial state and its (read-only, shared) central body, so the
//! per-body work is distributed across a rayon thread pool with each
//! history written by exactly one task.

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::apsis_errors::ApsisError;
use crate::bodies::{BodyId, BodyRegistry, CentralBody, TrackedBody};
use crate::cartesian::CartesianState;
use crate::constants::{PropagationHistory, Second};
use crate::kepler::{
    eccentric_to_mean, hyperbolic_to_mean, true_to_eccentric, true_to_hyperbolic, KeplerSolver,
};
use crate::keplerian_element::OrbitRegime;
use crate::orb_elem::{cartesian_to_keplerian, keplerian_to_cartesian};

use std::sync::Arc;

/// Relative slack applied when counting output steps, absorbing the
/// floating-point error of `(interval_end − interval_start) / Δt`.
const SAMPLING_SLACK: f64 = 1e-9;

/// Caller-supplied propagation run parameters. The fields are private so
/// that every reachable value went through the validation of
/// [`PropagationConfig::new`]; no defaults are assumed silently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationConfig {
    /// Start of the propagation interval (s); the initial states refer to
    /// this epoch.
    interval_start: Second,
    /// End of the propagation interval (s), strictly greater than the start.
    interval_end: Second,
    /// Spacing of the output samples (s), strictly positive.
    fixed_output_interval: Second,
    /// Kepler-equation solver tolerance (rad), strictly positive.
    tolerance: f64,
    /// Kepler-equation iteration cap, strictly positive.
    max_iterations: usize,
}

impl PropagationConfig {
    pub fn new(
        interval_start: Second,
        interval_end: Second,
        fixed_output_interval: Second,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Self, ApsisError> {
        if !interval_start.is_finite() || !interval_end.is_finite() {
            return Err(ApsisError::Configuration(
                "propagation interval bounds must be finite".into(),
            ));
        }
        if interval_start >= interval_end {
            return Err(ApsisError::Configuration(format!(
                "interval start ({interval_start} s) must precede interval end ({interval_end} s)"
            )));
        }
        if !(fixed_output_interval > 0.0) || !fixed_output_interval.is_finite() {
            return Err(ApsisError::Configuration(format!(
                "fixed output interval must be strictly positive, got {fixed_output_interval}"
            )));
        }
        // Solver parameter validation is shared with the solver constructor.
        KeplerSolver::new(tolerance, max_iterations)?;

        Ok(Self {
            interval_start,
            interval_end,
            fixed_output_interval,
            tolerance,
            max_iterations,
        })
    }

    pub fn interval_start(&self) -> Second {
        self.interval_start
    }

    pub fn interval_end(&self) -> Second {
        self.interval_end
    }

    pub fn fixed_output_interval(&self) -> Second {
        self.fixed_output_interval
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Number of output steps after the first sample: the largest `k` with
    /// `interval_start + k·Δt ≤ interval_end`, up to the sampling slack.
    fn sample_steps(&self) -> usize {
        let span = self.interval_end - self.interval_start;
        (span / self.fixed_output_interval + SAMPLING_SLACK).floor() as usize
    }
}

/// Per-body result of a propagation run.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationOutcome {
    /// The body has not been propagated yet.
    Pending,
    /// The body's full history was produced.
    Propagated(PropagationHistory),
    /// A numerical failure stopped this body's propagation; the samples
    /// produced before the failure are retained.
    Failed {
        error: ApsisError,
        partial: PropagationHistory,
    },
}

/// Analytic two-body propagator over a registry of tracked bodies.
#[derive(Debug, Clone, Default)]
pub struct KeplerPropagator {
    registry: BodyRegistry,
    config: Option<PropagationConfig>,
    outcomes: Vec<PropagationOutcome>,
}

impl KeplerPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body to propagate. Idempotent per name.
    pub fn add_body(&mut self, name: &str) -> BodyId {
        let id = self.registry.add_body(name);
        if (id.0 as usize) == self.outcomes.len() {
            self.outcomes.push(PropagationOutcome::Pending);
        }
        id
    }

    /// Set the central body a tracked body orbits. Idempotent; last write
    /// wins.
    pub fn set_central_body(
        &mut self,
        id: BodyId,
        central_body: Arc<CentralBody>,
    ) -> Result<(), ApsisError> {
        self.registry.set_central_body(id, central_body)
    }

    /// Set a tracked body's Cartesian state at `interval_start`. Idempotent;
    /// last write wins.
    pub fn set_initial_state(
        &mut self,
        id: BodyId,
        state: CartesianState,
    ) -> Result<(), ApsisError> {
        self.registry.set_initial_state(id, state)
    }

    /// Install the run configuration, moving the engine to `Configured`.
    ///
    /// The value is re-validated on the way in, so an invalid configuration
    /// is rejected here as a [`Configuration`](ApsisError::Configuration)
    /// error and never reaches a propagation run.
    pub fn configure(&mut self, config: PropagationConfig) -> Result<(), ApsisError> {
        let config = PropagationConfig::new(
            config.interval_start,
            config.interval_end,
            config.fixed_output_interval,
            config.tolerance,
            config.max_iterations,
        )?;
        self.config = Some(config);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn config(&self) -> Option<&PropagationConfig> {
        self.config.as_ref()
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Propagate every registered body across the configured interval.
    ///
    /// Fails up front — with nothing propagated — when the engine is not
    /// configured or any body is missing its central body or initial state.
    /// Per-body numerical failures do not fail the run; they are recorded
    /// in the body's [`PropagationOutcome`].
    pub fn propagate(&mut self) -> Result<(), ApsisError> {
        let config = self.config.ok_or_else(|| {
            ApsisError::Configuration(
                "propagate() called before the propagator was configured".into(),
            )
        })?;

        let missing = self.registry.missing_configuration();
        if !missing.is_empty() {
            return Err(ApsisError::Configuration(format!(
                "bodies missing a central body or initial state: {}",
                missing.join(", ")
            )));
        }

        // Snapshot the per-body inputs; validation above guarantees both
        // fields are present.
        let inputs: Vec<(&str, &CartesianState, f64)> = self
            .registry
            .iter()
            .filter_map(|(_, body): (BodyId, &TrackedBody)| {
                match (body.initial_state(), body.central_body()) {
                    (Some(state), Some(central)) => {
                        Some((body.name.as_str(), state, central.gravitational_parameter))
                    }
                    _ => None,
                }
            })
            .collect();

        self.outcomes = inputs
            .par_iter()
            .map(|&(name, state, mu)| match propagate_body(state, mu, &config) {
                Ok(history) => {
                    debug!("propagated {} ({} samples)", name, history.len());
                    PropagationOutcome::Propagated(history)
                }
                Err((error, partial)) => {
                    warn!("propagation of {} failed: {}", name, error);
                    PropagationOutcome::Failed { error, partial }
                }
            })
            .collect();

        let failures = self
            .outcomes
            .iter()
            .filter(|outcome| matches!(outcome, PropagationOutcome::Failed { .. }))
            .count();
        info!(
            "propagation run finished: {} bodies, {} failed",
            self.outcomes.len(),
            failures
        );
        Ok(())
    }

    /// Per-body outcome of the last run.
    pub fn outcome(&self, id: BodyId) -> Result<&PropagationOutcome, ApsisError> {
        self.outcomes
            .get(id.0 as usize)
            .ok_or_else(|| ApsisError::OutOfRange(format!("unknown body id {}", id.0)))
    }

    /// Completed history of a body.
    ///
    /// Fails with an out-of-range error when the body was never propagated
    /// or its propagation failed (the partial history of a failed body is
    /// available through [`outcome`](Self::outcome)).
    pub fn history(&self, id: BodyId) -> Result<&PropagationHistory, ApsisError> {
        let name = |id: BodyId| {
            self.registry
                .get(id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("#{}", id.0))
        };
        match self.outcome(id)? {
            PropagationOutcome::Propagated(history) => Ok(history),
            PropagationOutcome::Pending => Err(ApsisError::OutOfRange(format!(
                "body {} has not been propagated",
                name(id)
            ))),
            PropagationOutcome::Failed { error, .. } => Err(ApsisError::OutOfRange(format!(
                "propagation of body {} failed: {error}",
                name(id)
            ))),
        }
    }

    /// State of a body at one sampled instant `t` (s).
    ///
    /// `t` must be one of the configured output instants; querying a time
    /// outside the configured interval, or between samples, is an
    /// out-of-range error.
    pub fn state_at(&self, id: BodyId, t: Second) -> Result<&CartesianState, ApsisError> {
        let history = self.history(id)?;
        history.get(&OrderedFloat(t)).ok_or_else(|| {
            let config = self.config.as_ref();
            let outside = config
                .map(|c| t < c.interval_start || t > c.interval_end)
                .unwrap_or(true);
            if outside {
                ApsisError::OutOfRange(format!(
                    "instant {t} s lies outside the configured propagation interval"
                ))
            } else {
                ApsisError::OutOfRange(format!("instant {t} s is not a sampled output instant"))
            }
        })
    }
}

/// Propagate one body across the configured interval.
///
/// On failure, returns the error together with the partial history built up
/// to that point.
fn propagate_body(
    initial: &CartesianState,
    mu: f64,
    config: &PropagationConfig,
) -> Result<PropagationHistory, (ApsisError, PropagationHistory)> {
    let mut history = PropagationHistory::new();

    let elements = match cartesian_to_keplerian(initial, mu) {
        Ok(elements) => elements,
        Err(error) => return Err((error, history)),
    };
    let eccentricity = elements.eccentricity;

    // Regime-specific mean motion and initial mean anomaly. The parabolic
    // band has neither and is rejected before any sampling.
    let (mean_motion, initial_mean_anomaly) = match elements.regime() {
        OrbitRegime::Elliptic => {
            let e_anom = true_to_eccentric(elements.true_anomaly, eccentricity);
            (
                (mu / elements.semi_major_axis.powi(3)).sqrt(),
                eccentric_to_mean(e_anom, eccentricity),
            )
        }
        OrbitRegime::Hyperbolic => {
            let h_anom = true_to_hyperbolic(elements.true_anomaly, eccentricity);
            (
                (mu / (-elements.semi_major_axis).powi(3)).sqrt(),
                hyperbolic_to_mean(h_anom, eccentricity),
            )
        }
        OrbitRegime::Parabolic => {
            return Err((
                ApsisError::DegenerateOrbit(format!(
                    "parabolic orbit (e = {eccentricity}): no closed-form anomaly path available"
                )),
                history,
            ));
        }
    };

    let solver = match KeplerSolver::new(config.tolerance, config.max_iterations) {
        Ok(solver) => solver,
        Err(error) => return Err((error, history)),
    };

    for k in 0..=config.sample_steps() {
        let t = config.interval_start + k as f64 * config.fixed_output_interval;

        // The first sample is the caller's initial state, bit-for-bit.
        if k == 0 {
            history.insert(OrderedFloat(t), *initial);
            continue;
        }

        let mean_anomaly = initial_mean_anomaly + mean_motion * (t - config.interval_start);
        let anomaly = match solver.solve(mean_anomaly, eccentricity) {
            Ok(anomaly) => anomaly,
            Err(error) => return Err((error, history)),
        };

        let sampled = elements.with_true_anomaly(anomaly.to_true(eccentricity));
        let state = match keplerian_to_cartesian(&sampled, mu) {
            Ok(state) => state,
            Err(error) => return Err((error, history)),
        };
        history.insert(OrderedFloat(t), state);
    }

    Ok(history)
}
