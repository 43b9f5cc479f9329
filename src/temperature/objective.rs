//! CoV objective for the β increment search.

use crate::minimize::UnivariateObjective;
use crate::stats;

/// Objective value reported when the weights over- or underflow.
///
/// Large enough that the minimizer steers away from the region instead of
/// failing on it.
pub const DEGENERATE_METRIC: f64 = 1e100;

/// `δ ↦ (CoV(w(δ)) - target)²`.
///
/// For a candidate increment δ the weights are
/// `wᵢ = exp(δ · (llkᵢ - median(llk)))`, rescaled so that `mean(w) = 1`.
/// Subtracting the median keeps the exponent centred and delays overflow.
///
/// The weight buffer, CoV and metric of the most recent evaluation are kept
/// so the caller can read them back for the δ it settles on.
#[derive(Debug, Clone)]
pub struct CovObjective<'a> {
    llk: &'a [f64],
    median: f64,
    target: f64,
    weights: Vec<f64>,
    dbeta: f64,
    cov: f64,
    metric: f64,
}

impl<'a> CovObjective<'a> {
    pub fn new(llk: &'a [f64], median: f64, target: f64) -> Self {
        Self {
            llk,
            median,
            target,
            weights: vec![0.0; llk.len()],
            dbeta: f64::NAN,
            cov: f64::NAN,
            metric: f64::NAN,
        }
    }

    /// δ of the last evaluation.
    pub fn dbeta(&self) -> f64 {
        self.dbeta
    }

    /// CoV of the last evaluation; `NaN` when the weights degenerated.
    pub fn cov(&self) -> f64 {
        self.cov
    }

    /// Objective value of the last evaluation.
    pub fn metric(&self) -> f64 {
        self.metric
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// `CoV - target` of the last evaluation.
    pub fn residual(&self) -> f64 {
        self.cov - self.target
    }

    /// Normalized weights of the last evaluation.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }
}

impl UnivariateObjective for CovObjective<'_> {
    fn evaluate(&mut self, dbeta: f64) -> f64 {
        self.dbeta = dbeta;

        for (w, &llk) in self.weights.iter_mut().zip(self.llk) {
            *w = (dbeta * (llk - self.median)).exp();
        }
        let sum: f64 = self.weights.iter().sum();
        let scale = self.weights.len() as f64 / sum;
        for w in &mut self.weights {
            *w *= scale;
        }

        match stats::coefficient_of_variation(&self.weights) {
            Some(cov) if cov.is_finite() => {
                self.cov = cov;
                self.metric = (cov - self.target).powi(2);
            }
            _ => {
                self.cov = f64::NAN;
                self.metric = DEGENERATE_METRIC;
            }
        }
        self.metric
    }
}
