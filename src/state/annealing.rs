//! Per-run annealing state.

use super::matrix::Covariance;
use super::population::Population;
use crate::error::{AnnealError, Result};

/// Lower end of the annealing interval (prior only).
pub const BETA_MIN: f64 = 0.0;

/// Upper end of the annealing interval (full posterior).
pub const BETA_MAX: f64 = 1.0;

/// State carried across annealing stages.
///
/// Created once per run by the caller and mutated in place by one
/// [`CovScheduler::update`](crate::scheduler::CovScheduler::update) per stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealingState {
    /// Inverse temperature β ∈ [0, 1], non-decreasing across stages.
    pub beta: f64,
    /// Coefficient of variation of the latest importance weights.
    pub cov: f64,
    /// Proposal covariance Σ (`P × P`).
    pub sigma: Covariance,
    /// The particle population.
    pub population: Population,
}

impl AnnealingState {
    /// Fresh state at β = 0 with an identity proposal covariance.
    pub fn new(population: Population) -> Self {
        let sigma = Covariance::identity(population.parameters());
        Self {
            beta: BETA_MIN,
            cov: 0.0,
            sigma,
            population,
        }
    }

    pub fn samples(&self) -> usize {
        self.population.len()
    }

    pub fn parameters(&self) -> usize {
        self.population.parameters()
    }

    /// Whether the schedule has reached the full posterior.
    pub fn is_complete(&self) -> bool {
        self.beta >= BETA_MAX
    }

    /// Fails fast when β has left the annealing interval.
    pub fn check_beta(&self) -> Result<()> {
        if !(BETA_MIN..=BETA_MAX).contains(&self.beta) {
            return Err(AnnealError::BetaOutOfRange { beta: self.beta });
        }
        Ok(())
    }

    /// Recomputes `posterior = prior + β · data` for every particle.
    pub fn refresh_posterior(&mut self) {
        let beta = self.beta;
        let n = self.population.len();
        for i in 0..n {
            let value = self.population.prior()[i] + beta * self.population.data()[i];
            self.population.posterior_mut()[i] = value;
        }
    }
}
