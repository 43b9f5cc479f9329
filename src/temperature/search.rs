//! β increment search.

use super::config::SearchConfig;
use super::objective::{CovObjective, DEGENERATE_METRIC};
use super::trace::{NoopObserver, SearchObserver, SearchTrace};
use crate::error::{AnnealError, Result};
use crate::minimize::{Bracket, Brent, UnivariateObjective};
use crate::state::{BETA_MAX, BETA_MIN};
use crate::stats;
use log::{debug, info, warn};

/// Result of one temperature search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    /// Chosen increment δ ∈ `[0, 1 - β]`.
    pub dbeta: f64,
    /// β after the increment.
    pub beta: f64,
    /// CoV of [`weights`](Self::weights).
    pub cov: f64,
    /// Importance weights at `dbeta`, normalized to `mean = 1`.
    pub weights: Vec<f64>,
    /// Bisection and minimizer iterations spent (0 on the fast path).
    pub iterations: usize,
    /// Whether `|cov - target| < tolerance`, or the fast path was taken.
    pub converged: bool,
    /// Whether the search jumped straight to β = 1.
    pub jumped_to_end: bool,
}

/// Finds the β increment that drives the weights' CoV to the target.
///
/// # Algorithm
///
/// 1. Evaluate the objective at δ = 1 - β. If the CoV there is already at or
///    below the target (or within tolerance), accept it: β becomes exactly 1.
/// 2. Otherwise evaluate both endpoints and the initial guess. While the
///    guess is no better than an endpoint, bisect `[0, 1 - β]` on the sign
///    of `CoV - target` (CoV is non-decreasing in δ).
/// 3. Run a bounded Brent minimization of `(CoV(δ) - target)²` on the
///    narrowed interval until the residual drops below the tolerance, the
///    iteration budget runs out or the bracket collapses. Bisection steps
///    count against the same budget.
/// 4. Re-evaluate at the minimizer's best point so the returned weights and
///    CoV belong to the returned δ.
///
/// Running out of iterations is not an error; the outcome is flagged
/// `converged = false` and a warning is logged.
#[derive(Debug, Clone, Default)]
pub struct TemperatureSearch {
    config: SearchConfig,
}

impl TemperatureSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches for δ given the data log-likelihoods, their median and the
    /// current β.
    pub fn find_increment(&self, llk: &[f64], median: f64, beta: f64) -> Result<SearchOutcome> {
        self.find_increment_observed(llk, median, beta, &mut NoopObserver)
    }

    /// Like [`find_increment`](Self::find_increment), reporting every
    /// iteration to `observer`.
    pub fn find_increment_observed(
        &self,
        llk: &[f64],
        median: f64,
        beta: f64,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchOutcome> {
        self.config.validate()?;
        if !(BETA_MIN..=BETA_MAX).contains(&beta) {
            return Err(AnnealError::BetaOutOfRange { beta });
        }
        stats::check_likelihoods(llk)?;

        let target = self.config.target_cov;
        let tolerance = self.config.tolerance;
        let within = |cov: f64| (cov - target).abs() < tolerance;

        let mut lower = 0.0;
        let mut upper = BETA_MAX - beta;
        let mut objective = CovObjective::new(llk, median, target);

        let mut f_upper = objective.evaluate(upper);
        if objective.cov() < target || within(objective.cov()) {
            info!(
                "skipping to beta = {BETA_MAX}: cov {:.6} at dbeta {:.6e}",
                objective.cov(),
                upper
            );
            let cov = objective.cov();
            return Ok(SearchOutcome {
                dbeta: upper,
                beta: BETA_MAX,
                cov,
                weights: objective.into_weights(),
                iterations: 0,
                converged: true,
                jumped_to_end: true,
            });
        }

        let mut f_lower = objective.evaluate(lower);
        let mut guess = self.config.initial_guess.min(0.5 * upper);
        let mut f_guess = objective.evaluate(guess);

        debug!(
            "dbeta search: median llk {median:.4}, target {target}, tolerance {tolerance}, max iterations {}",
            self.config.max_iterations
        );
        observe(observer, 0, lower, upper, &objective, within(objective.cov()));

        // Brent must start strictly below both ends, on the low-CoV side of
        // the target. Past the target CoV saturates at sqrt(N) while one
        // particle takes all the weight, and that flat stretch would capture
        // the minimizer. CoV grows with δ, so bisect on the sign of
        // `CoV - target` until the guess qualifies.
        let primed = |objective: &CovObjective<'_>, f_guess: f64, f_lower: f64, f_upper: f64| {
            within(objective.cov())
                || (objective.cov() < target
                    && f_guess < f_lower.min(f_upper)
                    && f_upper < DEGENERATE_METRIC)
        };
        let mut iterations = 0;
        while !primed(&objective, f_guess, f_lower, f_upper)
            && iterations < self.config.max_iterations
        {
            // A NaN CoV means the weights overflowed, so δ is too large.
            if objective.cov() < target {
                lower = guess;
                f_lower = f_guess;
            } else {
                upper = guess;
                f_upper = f_guess;
            }
            iterations += 1;
            guess = 0.5 * (lower + upper);
            f_guess = objective.evaluate(guess);
            observe(observer, iterations, lower, upper, &objective, within(objective.cov()));
        }

        let dbeta = if primed(&objective, f_guess, f_lower, f_upper) {
            let mut brent = Brent::new(
                &mut objective,
                Bracket {
                    lower,
                    upper,
                    guess,
                    f_lower,
                    f_upper,
                    f_guess,
                },
            )?;

            while iterations < self.config.max_iterations
                && brent.f_minimum() >= tolerance * tolerance
            {
                iterations += 1;
                brent.iterate(&mut objective);
                lower = brent.x_lower();
                upper = brent.x_upper();

                let done = within(objective.cov());
                observe(observer, iterations, lower, upper, &objective, done);
                if done {
                    break;
                }
                if brent.is_collapsed() {
                    debug!("dbeta bracket collapsed at [{lower:.6e}, {upper:.6e}]");
                    break;
                }
            }
            brent.x_minimum()
        } else {
            // Budget spent while bisecting.
            [(guess, f_guess), (lower, f_lower), (upper, f_upper)]
                .into_iter()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(guess, |(x, _)| x)
        };

        objective.evaluate(dbeta);
        let cov = objective.cov();
        let converged = within(cov);
        if !converged {
            warn!(
                "dbeta search did not converge after {iterations} iterations: \
                 dbeta {dbeta:.6e}, cov {cov:.6}, target {target}"
            );
        }

        Ok(SearchOutcome {
            dbeta,
            beta: (beta + dbeta).min(BETA_MAX),
            cov,
            weights: objective.into_weights(),
            iterations,
            converged,
            jumped_to_end: false,
        })
    }
}

fn observe(
    observer: &mut dyn SearchObserver,
    iteration: usize,
    lower: f64,
    upper: f64,
    objective: &CovObjective<'_>,
    converged: bool,
) {
    let trace = SearchTrace {
        iteration,
        lower,
        upper,
        dbeta: objective.dbeta(),
        cov: objective.cov(),
        residual: objective.residual(),
        metric: objective.metric(),
        converged,
    };
    debug!(
        "{:>5} [{:.4e}, {:.4e}] dbeta {:.4e} cov {:.4e} err {:.4e} f {:.4e}{}",
        trace.iteration,
        trace.lower,
        trace.upper,
        trace.dbeta,
        trace.cov,
        trace.residual,
        trace.metric,
        if converged { " (converged)" } else { "" }
    );
    observer.on_iteration(&trace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temperature::TraceRecorder;

    const LLK: [f64; 4] = [-4.0, -3.0, -2.0, -1.0];

    fn search() -> TemperatureSearch {
        TemperatureSearch::new(
            SearchConfig::default()
                .with_target_cov(1.0)
                .with_tolerance(1e-3)
                .with_max_iterations(50),
        )
    }

    fn spread_llk(n: usize, scale: f64) -> Vec<f64> {
        (0..n).map(|i| -scale * i as f64).collect()
    }

    #[test]
    fn test_example_scenario_converges() {
        let median = stats::median(&LLK).unwrap();
        let outcome = search().find_increment(&LLK, median, 0.0).unwrap();

        assert!(!outcome.jumped_to_end);
        assert!(outcome.converged, "cov {}", outcome.cov);
        assert!((outcome.cov - 1.0).abs() < 1e-3);
        assert!(outcome.dbeta > 0.0 && outcome.dbeta <= 1.0);
        assert!((outcome.beta - outcome.dbeta).abs() < 1e-15);
        assert!((stats::mean(&outcome.weights).unwrap() - 1.0).abs() < 1e-12);
        let cov = stats::coefficient_of_variation(&outcome.weights).unwrap();
        assert!((cov - outcome.cov).abs() < 1e-12);
    }

    #[test]
    fn test_fast_path_sets_beta_to_one() {
        // Flat likelihoods: any δ leaves the weights equal.
        let llk = [-2.0; 6];
        let outcome = search().find_increment(&llk, -2.0, 0.3).unwrap();

        assert!(outcome.jumped_to_end);
        assert_eq!(outcome.beta, 1.0);
        assert!((outcome.dbeta - 0.7).abs() < 1e-15);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.cov, 0.0);
    }

    #[test]
    fn test_fast_path_at_beta_one() {
        let outcome = search().find_increment(&LLK, -2.5, 1.0).unwrap();
        assert!(outcome.jumped_to_end);
        assert_eq!(outcome.dbeta, 0.0);
        assert_eq!(outcome.beta, 1.0);
        assert_eq!(outcome.weights, vec![1.0; 4]);
    }

    #[test]
    fn test_fast_path_skips_trace() {
        let mut recorder = TraceRecorder::new();
        search()
            .find_increment_observed(&[-1.0, -1.0], -1.0, 0.0, &mut recorder)
            .unwrap();
        assert!(recorder.records.is_empty());
    }

    #[test]
    fn test_trace_records_iterations() {
        let llk = spread_llk(50, 10.0);
        let median = stats::median(&llk).unwrap();
        let mut recorder = TraceRecorder::new();
        let outcome = search()
            .find_increment_observed(&llk, median, 0.0, &mut recorder)
            .unwrap();

        assert_eq!(recorder.records.len(), outcome.iterations + 1);
        assert_eq!(recorder.records[0].iteration, 0);
        for pair in recorder.records.windows(2) {
            assert!(pair[1].lower >= pair[0].lower);
            assert!(pair[1].upper <= pair[0].upper);
        }
        if recorder.records.iter().any(|r| r.converged) {
            assert!(outcome.converged);
        }
    }

    #[test]
    fn test_wide_spread_needs_small_increment() {
        let llk = spread_llk(200, 100.0);
        let median = stats::median(&llk).unwrap();
        let outcome = search().find_increment(&llk, median, 0.0).unwrap();

        assert!(outcome.converged);
        assert!(outcome.dbeta < 0.01, "dbeta {}", outcome.dbeta);
        assert!(outcome.weights.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_overflowing_upper_end_is_routed_around() {
        // exp(1 · 1e4) overflows, so the upper end is degenerate.
        let llk = spread_llk(20, 1.0e3);
        let median = stats::median(&llk).unwrap();
        let outcome = search().find_increment(&llk, median, 0.0).unwrap();

        assert!(outcome.cov.is_finite());
        assert!(outcome.converged);
    }

    #[test]
    fn test_saturated_weights_do_not_capture_search() {
        // Three particles far apart: past δ ≈ 0.002 one particle holds all
        // the weight and CoV sits at sqrt(3), a flat stretch whose metric is
        // lower than the metric at the initial guess.
        let llk = [-3067.56, -4651.67, -7583.11];
        let median = stats::median(&llk).unwrap();
        let outcome = search().find_increment(&llk, median, 0.368).unwrap();

        assert!(outcome.converged, "dbeta {} cov {}", outcome.dbeta, outcome.cov);
        assert!((outcome.cov - 1.0).abs() < 1e-3);
        assert!((outcome.dbeta - 6.2e-4).abs() < 1e-5, "dbeta {}", outcome.dbeta);
        assert!(outcome.weights.iter().all(|&w| w > 1e-3));
    }

    #[test]
    fn test_bisection_steps_past_rounding_noise_on_plateau() {
        // Bisection lands on the saturated stretch one ulp below the upper
        // end's metric; that point must not seed the minimizer.
        let llk = [-1266.9274131529069, -4068.557000514975, -5025.151960589063];
        let median = stats::median(&llk).unwrap();
        let mut recorder = TraceRecorder::new();
        let outcome = search()
            .find_increment_observed(&llk, median, 0.0, &mut recorder)
            .unwrap();

        assert!(outcome.converged, "dbeta {} cov {}", outcome.dbeta, outcome.cov);
        assert!(outcome.dbeta < 2e-3);
        assert_eq!(recorder.records.len(), outcome.iterations + 1);
        assert!(recorder.records.last().is_some_and(|r| r.converged));
    }

    #[test]
    fn test_iteration_budget_exhaustion_is_not_an_error() {
        let llk = spread_llk(100, 5.0);
        let median = stats::median(&llk).unwrap();
        let search = TemperatureSearch::new(
            SearchConfig::default()
                .with_tolerance(1e-14)
                .with_max_iterations(2),
        );
        let outcome = search.find_increment(&llk, median, 0.0).unwrap();

        assert!(!outcome.converged);
        assert!(outcome.iterations <= 2);
        assert!(outcome.dbeta >= 0.0 && outcome.dbeta <= 1.0);
        assert!((stats::mean(&outcome.weights).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_beta_stays_bounded_mid_run() {
        let llk = spread_llk(30, 0.5);
        let median = stats::median(&llk).unwrap();
        let outcome = search().find_increment(&llk, median, 0.9).unwrap();
        assert!(outcome.beta >= 0.9 && outcome.beta <= 1.0);
    }

    #[test]
    fn test_beta_out_of_range_fails_fast() {
        let err = search().find_increment(&LLK, -2.5, 1.2).unwrap_err();
        assert_eq!(err, AnnealError::BetaOutOfRange { beta: 1.2 });

        let err = search().find_increment(&LLK, -2.5, -0.1).unwrap_err();
        assert!(matches!(err, AnnealError::BetaOutOfRange { .. }));
    }

    #[test]
    fn test_non_finite_likelihood_rejected() {
        let llk = [-1.0, f64::NEG_INFINITY, -2.0];
        let err = search().find_increment(&llk, -1.5, 0.0).unwrap_err();
        assert!(matches!(err, AnnealError::NonFiniteLikelihood { index: 1, .. }));
    }

    #[test]
    fn test_empty_likelihoods_rejected() {
        assert_eq!(
            search().find_increment(&[], 0.0, 0.0),
            Err(AnnealError::EmptyPopulation)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let search = TemperatureSearch::new(SearchConfig::default().with_tolerance(0.0));
        assert!(matches!(
            search.find_increment(&LLK, -2.5, 0.0),
            Err(AnnealError::InvalidConfig { .. })
        ));
    }
}
