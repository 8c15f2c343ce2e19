use thiserror::Error;

/// Error taxonomy of the `apsis` propagation core.
///
/// Configuration errors are fatal for a whole run: nothing is propagated.
/// Numerical failures (convergence, degenerate orbit) are local to the body
/// that produced them; the run continues for the remaining bodies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApsisError {
    #[error("invalid propagation configuration: {0}")]
    Configuration(String),

    #[error(
        "Kepler equation did not converge after {iterations} iterations \
         (last correction {last_correction:.3e}, tolerance {tolerance:.3e})"
    )]
    Convergence {
        iterations: usize,
        last_correction: f64,
        tolerance: f64,
    },

    #[error("degenerate orbit: {0}")]
    DegenerateOrbit(String),

    #[error("out of range: {0}")]
    OutOfRange(String),
}
