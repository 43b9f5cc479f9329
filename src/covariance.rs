//! Weighted covariance of the particle population.
//!
//! The proposal covariance Σ for the next stage's Markov chains is the
//! weighted population covariance about the weighted mean:
//!
//! ```text
//! pᵢ = wᵢ / Σⱼ wⱼ
//! θ̄  = Σᵢ pᵢ θᵢ
//! Σ  = Σᵢ pᵢ θᵢθᵢᵗ - θ̄θ̄ᵗ = Σᵢ pᵢ (θᵢ - θ̄)(θᵢ - θ̄)ᵗ
//! ```
//!
//! The centred form on the right is what gets accumulated: it has the same
//! value but does not cancel catastrophically when `|θ̄|` dwarfs the spread,
//! and it is positive semi-definite term by term.

use crate::error::{AnnealError, Result};
use crate::state::{Covariance, Population};
use crate::stats;

/// Post-processing applied to Σ after estimation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conditioning {
    /// Leave Σ untouched.
    #[default]
    None,

    /// Add a fixed `ε` to every diagonal entry.
    DiagonalJitter(f64),

    /// Add `ε · mean(diag Σ)` to every diagonal entry.
    ///
    /// Scale-aware; falls back to an absolute `ε` when the diagonal is zero.
    RelativeJitter(f64),
}

impl Conditioning {
    /// Applies the conditioning in place.
    pub fn apply(&self, sigma: &mut Covariance) {
        let jitter = match *self {
            Conditioning::None => return,
            Conditioning::DiagonalJitter(eps) => eps,
            Conditioning::RelativeJitter(eps) => {
                let scale = stats::mean(&sigma.diagonal()).unwrap_or(0.0);
                if scale > 0.0 {
                    eps * scale
                } else {
                    eps
                }
            }
        };
        for i in 0..sigma.dim() {
            let v = sigma.get(i, i);
            sigma.set(i, i, v + jitter);
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Conditioning::None => Ok(()),
            Conditioning::DiagonalJitter(eps) | Conditioning::RelativeJitter(eps) => {
                if eps.is_finite() && eps >= 0.0 {
                    Ok(())
                } else {
                    Err(AnnealError::config(format!(
                        "conditioning jitter must be finite and non-negative, got {eps}"
                    )))
                }
            }
        }
    }
}

/// Estimates the proposal covariance from a weighted population.
#[derive(Debug, Clone, Copy, Default)]
pub struct CovarianceEstimator {
    conditioning: Conditioning,
}

impl CovarianceEstimator {
    pub fn new(conditioning: Conditioning) -> Self {
        Self { conditioning }
    }

    /// Weighted mean θ̄ of the parameter vectors.
    pub fn weighted_mean(population: &Population, weights: &[f64]) -> Result<Vec<f64>> {
        check_weights(population, weights)?;
        let probs = stats::probabilities(weights)?;
        Ok(mean_of(population, &probs))
    }

    /// Weighted covariance Σ, symmetric and conditioned.
    ///
    /// `weights` may be on any scale; they are rescaled to sum to 1.
    pub fn estimate(&self, population: &Population, weights: &[f64]) -> Result<Covariance> {
        check_weights(population, weights)?;
        let probs = stats::probabilities(weights)?;

        let dim = population.parameters();
        let theta_bar = mean_of(population, &probs);

        let mut sigma = Covariance::zeros(dim);
        let mut centred = vec![0.0; dim];
        for (sample, &p) in probs.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for ((c, &x), &m) in centred
                .iter_mut()
                .zip(population.theta_row(sample))
                .zip(&theta_bar)
            {
                *c = x - m;
            }
            // Lower triangle only; mirrored below.
            for i in 0..dim {
                let pci = p * centred[i];
                for j in 0..=i {
                    let v = sigma.get(i, j) + pci * centred[j];
                    sigma.set(i, j, v);
                }
            }
        }
        sigma.mirror_lower();

        self.conditioning.apply(&mut sigma);
        Ok(sigma)
    }
}

fn check_weights(population: &Population, weights: &[f64]) -> Result<()> {
    if weights.len() != population.len() {
        return Err(AnnealError::DimensionMismatch {
            what: "weights",
            expected: population.len(),
            found: weights.len(),
        });
    }
    Ok(())
}

fn mean_of(population: &Population, probs: &[f64]) -> Vec<f64> {
    let mut theta_bar = vec![0.0; population.parameters()];
    for (sample, &p) in probs.iter().enumerate() {
        for (m, &x) in theta_bar.iter_mut().zip(population.theta_row(sample)) {
            *m += p * x;
        }
    }
    theta_bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Particle;

    fn population(rows: &[&[f64]]) -> Population {
        let particles: Vec<Particle> = rows
            .iter()
            .map(|row| Particle {
                theta: row.to_vec(),
                prior: 0.0,
                data: 0.0,
                posterior: 0.0,
            })
            .collect();
        Population::from_particles(&particles).unwrap()
    }

    #[test]
    fn test_equal_weights_population_variance() {
        let pop = population(&[&[0.0], &[1.0], &[2.0], &[3.0]]);
        let sigma = CovarianceEstimator::default()
            .estimate(&pop, &[1.0; 4])
            .unwrap();
        // Population variance of 0..=3 is 1.25.
        assert!((sigma.get(0, 0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_weight_scale_invariance() {
        let pop = population(&[&[0.0, 1.0], &[1.0, -1.0], &[2.0, 0.5]]);
        let estimator = CovarianceEstimator::default();
        let a = estimator.estimate(&pop, &[0.5, 1.0, 1.5]).unwrap();
        let b = estimator.estimate(&pop, &[1.0, 2.0, 3.0]).unwrap();
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_full_symmetry_in_three_dimensions() {
        let pop = population(&[
            &[1.0, 2.0, 3.0],
            &[2.0, 1.0, 0.0],
            &[0.5, 3.0, 1.0],
            &[4.0, -1.0, 2.0],
            &[-2.0, 0.0, 5.0],
        ]);
        let sigma = CovarianceEstimator::default()
            .estimate(&pop, &[0.1, 0.4, 1.2, 2.0, 1.3])
            .unwrap();
        assert!(sigma.is_symmetric(0.0));
        // Off-diagonals away from the first row/column are filled too.
        assert!(sigma.get(1, 2) != 0.0);
        assert_eq!(sigma.get(1, 2), sigma.get(2, 1));
    }

    #[test]
    fn test_matches_raw_moment_formula() {
        let pop = population(&[&[1.0, 0.0], &[0.0, 2.0], &[3.0, 1.0]]);
        let w = [0.2, 0.3, 0.5];
        let sigma = CovarianceEstimator::default().estimate(&pop, &w).unwrap();

        let mean = CovarianceEstimator::weighted_mean(&pop, &w).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let raw: f64 = (0..3)
                    .map(|k| w[k] * pop.theta_row(k)[i] * pop.theta_row(k)[j])
                    .sum();
                let expected = raw - mean[i] * mean[j];
                assert!((sigma.get(i, j) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_single_dominant_weight_collapses() {
        let pop = population(&[&[5.0, 5.0], &[1.0, 2.0]]);
        let sigma = CovarianceEstimator::default()
            .estimate(&pop, &[1.0, 0.0])
            .unwrap();
        assert!(sigma.as_slice().iter().all(|&v| v.abs() < 1e-15));
    }

    #[test]
    fn test_weighted_mean() {
        let pop = population(&[&[0.0], &[10.0]]);
        let mean = CovarianceEstimator::weighted_mean(&pop, &[3.0, 1.0]).unwrap();
        assert!((mean[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_jitter() {
        let pop = population(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let sigma = CovarianceEstimator::new(Conditioning::DiagonalJitter(1e-6))
            .estimate(&pop, &[1.0, 1.0])
            .unwrap();
        assert_eq!(sigma.diagonal(), vec![1e-6, 1e-6]);
        assert_eq!(sigma.get(0, 1), 0.0);
    }

    #[test]
    fn test_relative_jitter_scales_with_diagonal() {
        let mut sigma = Covariance::identity(2);
        sigma.set(1, 1, 3.0);
        Conditioning::RelativeJitter(0.1).apply(&mut sigma);
        assert!((sigma.get(0, 0) - 1.2).abs() < 1e-12);
        assert!((sigma.get(1, 1) - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_conditioning_validate() {
        assert!(Conditioning::None.validate().is_ok());
        assert!(Conditioning::DiagonalJitter(1e-8).validate().is_ok());
        assert!(Conditioning::RelativeJitter(-1.0).validate().is_err());
    }

    #[test]
    fn test_weight_length_mismatch() {
        let pop = population(&[&[0.0], &[1.0]]);
        let err = CovarianceEstimator::default()
            .estimate(&pop, &[1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            AnnealError::DimensionMismatch { what: "weights", expected: 2, found: 1 }
        ));
    }
}
