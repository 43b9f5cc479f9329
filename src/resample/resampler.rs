//! Replica counting and population rebuild.

use super::scheme::ResamplingScheme;
use crate::error::{AnnealError, Result};
use crate::state::Population;
use crate::stats;
use log::warn;
use rand::Rng;

/// Draws replica counts from importance weights and rebuilds the population.
///
/// Weights may be on any scale: they are normalized to probabilities before
/// the cumulative boundaries are built, so the draws in `[0, 1)` cover the
/// whole population.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resampler {
    scheme: ResamplingScheme,
}

impl Resampler {
    pub fn new(scheme: ResamplingScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> ResamplingScheme {
        self.scheme
    }

    /// Replica count for every particle; the counts always add up to `N`.
    ///
    /// Particles with zero weight are never drawn. Should bucketing ever
    /// come up short, the remainder goes to the highest-weight particle
    /// (lowest index on ties) and a warning is logged.
    pub fn counts<R: Rng>(&self, weights: &[f64], rng: &mut R) -> Result<Vec<usize>> {
        let probs = stats::probabilities(weights)?;
        let ticks = boundaries(&probs);
        let n = probs.len();

        let mut counts = vec![0usize; n];
        match self.scheme {
            ResamplingScheme::Multinomial => {
                for _ in 0..n {
                    let u: f64 = rng.random_range(0.0..1.0);
                    counts[bucket(&ticks, u)] += 1;
                }
            }
            ResamplingScheme::Systematic => {
                let last = last_positive(&probs);
                let offset: f64 = rng.random_range(0.0..1.0) / n as f64;
                let mut k = 0;
                for i in 0..n {
                    let point = offset + i as f64 / n as f64;
                    while k < last && ticks[k + 1] <= point {
                        k += 1;
                    }
                    counts[k] += 1;
                }
            }
        }

        top_up(&mut counts, &probs);
        Ok(counts)
    }

    /// Draws a new, equally weighted population of the same size.
    ///
    /// `population` is only read; the result is a fresh buffer, so a particle
    /// copied into an early slot can still be read for later slots.
    pub fn resample<R: Rng>(
        &self,
        population: &Population,
        weights: &[f64],
        rng: &mut R,
    ) -> Result<Population> {
        if weights.len() != population.len() {
            return Err(AnnealError::DimensionMismatch {
                what: "weights",
                expected: population.len(),
                found: weights.len(),
            });
        }
        let counts = self.counts(weights, rng)?;
        replicate(population, &counts)
    }
}

/// Rebuilds a population from replica counts.
///
/// Particles are visited in order of decreasing count (ascending index on
/// ties) and each is copied, with all of its log-likelihoods, into `count`
/// consecutive slots.
pub fn replicate(population: &Population, counts: &[usize]) -> Result<Population> {
    let n = population.len();
    if counts.len() != n {
        return Err(AnnealError::DimensionMismatch {
            what: "replica counts",
            expected: n,
            found: counts.len(),
        });
    }
    let drawn: usize = counts.iter().sum();
    if drawn != n {
        return Err(AnnealError::ResampleShortfall { drawn, expected: n });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    let mut next = Population::with_capacity(population.parameters(), n);
    for &source in &order {
        let count = counts[source];
        // Sorted, so everything after the first zero is zero too.
        if count == 0 {
            break;
        }
        for _ in 0..count {
            next.push_from(population, source);
        }
    }
    Ok(next)
}

/// Cumulative boundaries `t₀..=t_N`.
///
/// The upper edge of the last particle with positive weight, and everything
/// after it, is pinned to exactly 1 so rounding cannot leave a gap at the top.
fn boundaries(probs: &[f64]) -> Vec<f64> {
    let n = probs.len();
    let mut ticks = Vec::with_capacity(n + 1);
    let mut tick = 0.0;
    ticks.push(tick);
    for &p in probs {
        tick += p;
        ticks.push(tick);
    }
    for k in (last_positive(probs) + 1)..=n {
        ticks[k] = 1.0;
    }
    ticks
}

/// Index `k` with `t_k <= u < t_{k+1}`.
fn bucket(ticks: &[f64], u: f64) -> usize {
    let n = ticks.len() - 1;
    (ticks.partition_point(|&t| t <= u) - 1).min(n - 1)
}

fn last_positive(probs: &[f64]) -> usize {
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(probs.len() - 1)
}

fn top_up(counts: &mut [usize], probs: &[f64]) {
    let n = counts.len();
    let drawn: usize = counts.iter().sum();
    if drawn >= n {
        return;
    }
    let heaviest = probs
        .iter()
        .enumerate()
        .fold(0, |best, (i, &p)| if p > probs[best] { i } else { best });
    warn!(
        "resampling drew {drawn} of {n} replicas; adding {} to particle {heaviest}",
        n - drawn
    );
    counts[heaviest] += n - drawn;
}
