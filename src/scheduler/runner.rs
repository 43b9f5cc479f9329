//! Single-stage transition.

use super::config::SchedulerConfig;
use crate::covariance::CovarianceEstimator;
use crate::error::Result;
use crate::resample::{replicate, Resampler};
use crate::state::AnnealingState;
use crate::stats;
use crate::temperature::{NoopObserver, SearchObserver, SearchOutcome, TemperatureSearch};
use log::{debug, info, warn};
use rand::Rng;

/// Summary of one stage transition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageReport {
    /// β before the stage.
    pub beta_before: f64,
    /// β after the stage.
    pub beta: f64,
    pub dbeta: f64,
    /// CoV of the importance weights used by the stage.
    pub cov: f64,
    /// Temperature search iterations.
    pub iterations: usize,
    pub converged: bool,
    pub jumped_to_end: bool,
    /// Distinct particles that survived resampling.
    pub unique_particles: usize,
}

/// Runs one annealing stage: search, covariance, resample.
///
/// # Usage
///
/// ```ignore
/// let scheduler = CovScheduler::new(SchedulerConfig::default());
/// while !state.is_complete() {
///     scheduler.update(&mut state, &mut rng)?;
///     // ... Markov chain moves at the new β ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CovScheduler {
    config: SchedulerConfig,
    search: TemperatureSearch,
    estimator: CovarianceEstimator,
    resampler: Resampler,
}

impl Default for CovScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl CovScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            search: TemperatureSearch::new(config.search.clone()),
            estimator: CovarianceEstimator::new(config.conditioning),
            resampler: Resampler::new(config.scheme),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Computes the next β increment, its weights and CoV without touching
    /// `state`.
    pub fn find_increment(&self, state: &AnnealingState) -> Result<SearchOutcome> {
        self.find_increment_observed(state, &mut NoopObserver)
    }

    pub fn find_increment_observed(
        &self,
        state: &AnnealingState,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchOutcome> {
        state.check_beta()?;
        let llk = state.population.data();
        let median = stats::likelihood_median(llk)?;
        self.search
            .find_increment_observed(llk, median, state.beta, observer)
    }

    /// Performs one full stage transition in place.
    ///
    /// Nothing is committed unless every phase succeeds: on error `state`
    /// is left exactly as it was.
    pub fn update<R: Rng>(&self, state: &mut AnnealingState, rng: &mut R) -> Result<StageReport> {
        self.update_observed(state, rng, &mut NoopObserver)
    }

    /// [`update`](Self::update) with search diagnostics sent to `observer`.
    pub fn update_observed<R: Rng>(
        &self,
        state: &mut AnnealingState,
        rng: &mut R,
        observer: &mut dyn SearchObserver,
    ) -> Result<StageReport> {
        let beta_before = state.beta;
        let outcome = self.find_increment_observed(state, observer)?;
        debug!(
            "stage search: beta {beta_before:.6} -> {:.6} (dbeta {:.6e}, cov {:.6})",
            outcome.beta, outcome.dbeta, outcome.cov
        );

        let sigma = self.estimator.estimate(&state.population, &outcome.weights)?;
        debug!("stage covariance: diag {:?}", sigma.diagonal());
        if !sigma.is_positive_definite() {
            warn!(
                "stage covariance is not positive definite (cov {:.6}); proposals may not move",
                outcome.cov
            );
        }

        let counts = self.resampler.counts(&outcome.weights, rng)?;
        let population = replicate(&state.population, &counts)?;
        let unique_particles = counts.iter().filter(|&&c| c > 0).count();
        debug!(
            "stage resample: {unique_particles} of {} particles survive",
            counts.len()
        );

        state.beta = outcome.beta;
        state.cov = outcome.cov;
        state.sigma = sigma;
        state.population = population;
        state.refresh_posterior();

        info!(
            "beta {:.6} (dbeta {:.6e}), cov {:.4}, {} search iterations, {unique_particles} unique",
            state.beta, outcome.dbeta, outcome.cov, outcome.iterations
        );

        Ok(StageReport {
            beta_before,
            beta: outcome.beta,
            dbeta: outcome.dbeta,
            cov: outcome.cov,
            iterations: outcome.iterations,
            converged: outcome.converged,
            jumped_to_end: outcome.jumped_to_end,
            unique_particles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnealError;
    use crate::state::{Particle, Population};
    use crate::temperature::TraceRecorder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn example_state() -> AnnealingState {
        let particles: Vec<Particle> = (0..4)
            .map(|i| Particle {
                theta: vec![i as f64],
                prior: 0.0,
                data: -4.0 + i as f64,
                posterior: 0.0,
            })
            .collect();
        AnnealingState::new(Population::from_particles(&particles).unwrap())
    }

    fn scheduler() -> CovScheduler {
        CovScheduler::new(
            SchedulerConfig::default()
                .with_target_cov(1.0)
                .with_tolerance(1e-3)
                .with_max_iterations(50),
        )
    }

    #[test]
    fn test_find_increment_leaves_state_alone() {
        let state = example_state();
        let before = state.clone();
        let outcome = scheduler().find_increment(&state).unwrap();
        assert!(outcome.converged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_update_commits_everything() {
        let mut state = example_state();
        let mut rng = StdRng::seed_from_u64(5);
        let report = scheduler().update(&mut state, &mut rng).unwrap();

        assert_eq!(report.beta_before, 0.0);
        assert!(report.beta > 0.0 && report.beta <= 1.0);
        assert_eq!(state.beta, report.beta);
        assert_eq!(state.cov, report.cov);
        assert_eq!(state.samples(), 4);
        assert!(state.sigma.is_symmetric(0.0));
        assert!(report.unique_particles >= 1 && report.unique_particles <= 4);

        // Posterior follows the committed β.
        for i in 0..4 {
            let p = &state.population;
            assert!((p.posterior()[i] - (p.prior()[i] + state.beta * p.data()[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_update_fast_path_reaches_one() {
        let particles: Vec<Particle> = (0..5)
            .map(|i| Particle {
                theta: vec![i as f64, 1.0],
                prior: -1.0,
                data: -3.0,
                posterior: -1.0,
            })
            .collect();
        let mut state = AnnealingState::new(Population::from_particles(&particles).unwrap());
        let mut rng = StdRng::seed_from_u64(0);
        let report = scheduler().update(&mut state, &mut rng).unwrap();

        assert!(report.jumped_to_end);
        assert_eq!(state.beta, 1.0);
        assert!(state.is_complete());
        assert_eq!(state.population.posterior(), &[-4.0; 5]);
    }

    #[test]
    fn test_update_error_leaves_state_untouched() {
        let mut state = example_state();
        state.population.data_mut()[2] = f64::NAN;
        let before = state.clone();

        let mut rng = StdRng::seed_from_u64(0);
        let err = scheduler().update(&mut state, &mut rng).unwrap_err();
        assert!(matches!(err, AnnealError::NonFiniteLikelihood { index: 2, .. }));
        assert_eq!(format!("{state:?}"), format!("{before:?}"));
    }

    #[test]
    fn test_update_rejects_out_of_range_beta() {
        let mut state = example_state();
        state.beta = 2.0;
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            scheduler().update(&mut state, &mut rng),
            Err(AnnealError::BetaOutOfRange { beta: 2.0 })
        );
    }

    #[test]
    fn test_update_observed_forwards_trace() {
        let mut state = example_state();
        let mut rng = StdRng::seed_from_u64(5);
        let mut recorder = TraceRecorder::new();
        let report = scheduler()
            .update_observed(&mut state, &mut rng, &mut recorder)
            .unwrap();
        assert_eq!(recorder.records.len(), report.iterations + 1);
    }
}
