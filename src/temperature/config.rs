//! Temperature search configuration.

use crate::error::{AnnealError, Result};

/// Configuration for the β increment search.
///
/// The search interval itself is not configurable: it always spans
/// `[0, BETA_MAX - β]`.
///
/// # Examples
///
/// ```
/// use u_tmcmc::temperature::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_target_cov(1.0)
///     .with_tolerance(1e-3)
///     .with_max_iterations(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Target coefficient of variation of the weights. Conventionally 1.
    pub target_cov: f64,

    /// Accept a δ once `|CoV(δ) - target| < tolerance`.
    pub tolerance: f64,

    /// Iteration budget for the minimizer. Exhausting it is not an error;
    /// the best point found is returned and flagged as non-converged.
    pub max_iterations: usize,

    /// Interior starting guess for δ.
    ///
    /// Clamped to half the search interval when the interval is narrower.
    pub initial_guess: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            target_cov: 1.0,
            tolerance: 1e-3,
            max_iterations: 1000,
            initial_guess: 5.0e-5,
        }
    }
}

impl SearchConfig {
    pub fn with_target_cov(mut self, target: f64) -> Self {
        self.target_cov = target;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.target_cov.is_finite() && self.target_cov > 0.0) {
            return Err(AnnealError::config(format!(
                "target_cov must be positive and finite, got {}",
                self.target_cov
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AnnealError::config(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(AnnealError::config("max_iterations must be at least 1"));
        }
        if !(self.initial_guess.is_finite() && self.initial_guess > 0.0) {
            return Err(AnnealError::config(format!(
                "initial_guess must be positive and finite, got {}",
                self.initial_guess
            )));
        }
        Ok(())
    }
}
