//! Sampler state shared by the annealing components.
//!
//! - [`Particle`]: one parameter vector with its three log-likelihoods
//! - [`Population`]: `N` particles stored column-friendly (θ row-major)
//! - [`Covariance`]: dense symmetric `P × P` matrix used by proposals
//! - [`AnnealingState`]: β, CoV, Σ and the population, owned by the caller

mod annealing;
mod matrix;
mod population;

pub use annealing::{AnnealingState, BETA_MAX, BETA_MIN};
pub use matrix::Covariance;
pub use population::{Particle, Population};
