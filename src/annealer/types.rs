//! Core trait for the Markov chain step.

use crate::scheduler::StageReport;
use crate::state::AnnealingState;
use rand::Rng;

/// Acceptance statistics of one round of Markov chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainStats {
    pub accepted: usize,
    pub rejected: usize,
}

impl ChainStats {
    /// Fraction of accepted proposals; 0 when nothing was proposed.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.accepted + self.rejected;
        if total == 0 {
            0.0
        } else {
            self.accepted as f64 / total as f64
        }
    }
}

/// Explores the tempered posterior between annealing stages.
///
/// The annealer calls [`sample_posterior`](ChainSampler::sample_posterior)
/// right after each stage transition, with `state.beta` already advanced,
/// `state.sigma` holding the new proposal covariance and the population
/// freshly resampled. The sampler moves particles in place and must keep the
/// three log-likelihoods of every particle consistent with its θ.
///
/// # Examples
///
/// ```ignore
/// struct RandomWalk { model: MyModel, steps: usize }
///
/// impl ChainSampler for RandomWalk {
///     fn sample_posterior<R: Rng>(&self, state: &mut AnnealingState, rng: &mut R) -> ChainStats {
///         // propose θ' ~ N(θ, γ²Σ), accept with min(1, exp(post' - post)) ...
///         ChainStats::default()
///     }
/// }
/// ```
pub trait ChainSampler {
    /// Runs the chains at the current β and reports acceptance.
    fn sample_posterior<R: Rng>(&self, state: &mut AnnealingState, rng: &mut R) -> ChainStats;

    /// Adjusts the state after the chains ran, e.g. rescaling Σ from the
    /// acceptance rate. The default implementation is a no-op.
    fn equilibrate(&self, _state: &mut AnnealingState, _stats: &ChainStats) {}

    /// Called once per completed stage. The default implementation is a no-op.
    fn on_stage(&self, _stage: usize, _report: &StageReport) {}
}
