//! Annealing loop execution.

use super::config::AnnealerConfig;
use super::types::{ChainSampler, ChainStats};
use crate::error::Result;
use crate::scheduler::{CovScheduler, StageReport};
use crate::state::AnnealingState;
use log::{info, warn};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use u_numflow::random::create_rng;

/// What happened in one stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageRecord {
    /// Stage transition (search, covariance, resample).
    pub report: StageReport,
    /// Acceptance of the chains run after the transition.
    pub chain: ChainStats,
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    /// Final state; at β = 1 when `completed`.
    pub state: AnnealingState,

    /// Number of stages executed.
    pub stages: usize,

    /// One record per executed stage.
    pub history: Vec<StageRecord>,

    /// Whether β reached 1.
    pub completed: bool,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

impl AnnealResult {
    /// β after every stage, starting with the first stage's result.
    pub fn beta_history(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.report.beta).collect()
    }
}

/// Executes the annealing loop.
///
/// Each stage: transition via [`CovScheduler::update`], then the sampler's
/// chains, then [`ChainSampler::equilibrate`]. The loop ends when β = 1, the
/// stage budget is spent, or the cancellation flag is raised.
pub struct Annealer;

impl Annealer {
    /// Runs to completion with an RNG seeded from the config.
    ///
    /// # Errors
    /// Invalid configuration, or any stage failure (e.g. a non-finite data
    /// log-likelihood produced by the sampler).
    pub fn run<S: ChainSampler>(
        sampler: &S,
        state: AnnealingState,
        config: &AnnealerConfig,
    ) -> Result<AnnealResult> {
        Self::run_with_cancel(sampler, state, config, None)
    }

    /// Runs with an optional cancellation token, checked before every stage.
    pub fn run_with_cancel<S: ChainSampler>(
        sampler: &S,
        state: AnnealingState,
        config: &AnnealerConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        anneal(sampler, state, config, &mut rng, cancel)
    }

    /// Runs with a caller-owned random source; `config.seed` is ignored.
    pub fn run_with_rng<S: ChainSampler, R: Rng>(
        sampler: &S,
        state: AnnealingState,
        config: &AnnealerConfig,
        rng: &mut R,
    ) -> Result<AnnealResult> {
        anneal(sampler, state, config, rng, None)
    }
}

fn anneal<S: ChainSampler, R: Rng>(
    sampler: &S,
    mut state: AnnealingState,
    config: &AnnealerConfig,
    rng: &mut R,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<AnnealResult> {
    config.validate()?;
    state.check_beta()?;

    let scheduler = CovScheduler::new(config.scheduler.clone());
    let mut history = Vec::new();
    let mut cancelled = false;

    while !state.is_complete() && history.len() < config.max_stages {
        if let Some(ref flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
        }

        let report = scheduler.update(&mut state, rng)?;
        let chain = sampler.sample_posterior(&mut state, rng);
        sampler.equilibrate(&mut state, &chain);

        let stage = history.len() + 1;
        sampler.on_stage(stage, &report);
        info!(
            "stage {stage}: beta {:.6}, acceptance {:.3}",
            report.beta,
            chain.acceptance_rate()
        );
        history.push(StageRecord { report, chain });
    }

    let completed = state.is_complete();
    if !completed && !cancelled {
        warn!(
            "annealing stopped at beta {:.6} after {} stages without reaching 1",
            state.beta,
            history.len()
        );
    }

    Ok(AnnealResult {
        state,
        stages: history.len(),
        history,
        completed,
        cancelled,
    })
}
