//! Descriptive statistics for weights and log-likelihoods.
//!
//! `mean`, `std_dev` and `median` are the `u-numflow` implementations: the
//! standard deviation is the sample estimate (`n - 1` denominator), the
//! median of an even-length sample averages the two middle values, and all
//! three return `None` on empty or non-finite input instead of a
//! meaningless number.

use crate::error::{AnnealError, Result};
use u_numflow::stats::kahan_sum;

pub use u_numflow::stats::{mean, median, std_dev};

/// Coefficient of variation: `std_dev / mean`.
///
/// A single value has no spread, so its CoV is `0`. `None` if `values` is
/// empty or holds NaN/Inf.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sd = if values.len() < 2 { 0.0 } else { std_dev(values)? };
    Some(sd / m)
}

/// Checks that data log-likelihoods are usable for tempering.
///
/// # Errors
/// [`AnnealError::EmptyPopulation`] for an empty slice,
/// [`AnnealError::NonFiniteLikelihood`] for the first NaN or infinite entry.
pub fn check_likelihoods(llk: &[f64]) -> Result<()> {
    if llk.is_empty() {
        return Err(AnnealError::EmptyPopulation);
    }
    match llk.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(AnnealError::NonFiniteLikelihood { index, value }),
        None => Ok(()),
    }
}

/// Median of validated data log-likelihoods.
pub fn likelihood_median(llk: &[f64]) -> Result<f64> {
    check_likelihoods(llk)?;
    median(llk).ok_or(AnnealError::EmptyPopulation)
}

/// Rescales non-negative importance weights into probabilities summing to 1.
///
/// Accepts weights on any scale (mean-1 or sum-1 alike).
pub fn probabilities(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(AnnealError::EmptyPopulation);
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(AnnealError::InvalidWeights {
            reason: "weights must be finite and non-negative",
        });
    }
    let total = kahan_sum(weights);
    if !(total > 0.0 && total.is_finite()) {
        return Err(AnnealError::InvalidWeights {
            reason: "weights must have a positive finite sum",
        });
    }
    Ok(weights.iter().map(|w| w / total).collect())
}
