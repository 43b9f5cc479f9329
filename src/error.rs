//! Crate-wide error type.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnnealError>;

/// Errors raised by the annealing core.
///
/// Numerical degeneracy inside the temperature search and non-convergence
/// are deliberately absent: the former is routed around by the objective,
/// the latter is reported on the outcome with `converged = false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnealError {
    /// The current inverse temperature lies outside `[BETA_MIN, BETA_MAX]`.
    #[error("beta = {beta} is outside the annealing interval [0, 1]")]
    BetaOutOfRange { beta: f64 },

    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Two collections that must agree in length do not.
    #[error("{what}: expected length {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The population holds no particles.
    #[error("population is empty")]
    EmptyPopulation,

    /// A data log-likelihood is NaN or infinite.
    #[error("data log-likelihood at index {index} is not finite ({value})")]
    NonFiniteLikelihood { index: usize, value: f64 },

    /// A weight vector cannot be turned into a probability distribution.
    #[error("invalid weights: {reason}")]
    InvalidWeights { reason: &'static str },

    /// Replica counts do not add up to the population size.
    #[error("resampling produced {drawn} replicas, expected {expected}")]
    ResampleShortfall { drawn: usize, expected: usize },
}

impl AnnealError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        AnnealError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
