//! Annealing control and resampling core for Transitional Monte Carlo.
//!
//! Transitional / sequential Monte Carlo samplers (TMCMC, CATMIP) move a
//! population of particles from the prior (β = 0) to the posterior (β = 1)
//! through a sequence of tempered targets `p(θ) · L(θ)^β`. Each annealing
//! stage:
//!
//! - **Temperature search**: picks the β increment whose importance weights
//!   have a prescribed coefficient of variation.
//! - **Covariance**: estimates the weighted covariance of the population,
//!   used to scale Markov chain proposals in the next stage.
//! - **Resampling**: draws an equally weighted population in proportion to
//!   the weights.
//!
//! The Markov chain moves themselves, the forward model and the likelihood
//! are supplied by the caller; see [`annealer::ChainSampler`].
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use u_tmcmc::scheduler::{CovScheduler, SchedulerConfig};
//! use u_tmcmc::state::{AnnealingState, Particle, Population};
//!
//! let particles: Vec<Particle> = (0..4)
//!     .map(|i| Particle {
//!         theta: vec![i as f64],
//!         prior: 0.0,
//!         data: -4.0 + i as f64,
//!         posterior: 0.0,
//!     })
//!     .collect();
//! let mut state = AnnealingState::new(Population::from_particles(&particles).unwrap());
//!
//! let scheduler = CovScheduler::new(SchedulerConfig::default().with_max_iterations(50));
//! let mut rng = StdRng::seed_from_u64(42);
//! let report = scheduler.update(&mut state, &mut rng).unwrap();
//!
//! assert!(report.beta > 0.0 && report.beta <= 1.0);
//! assert_eq!(state.samples(), 4);
//! ```
//!
//! # Architecture
//!
//! Sits alongside `u-metaheur` at Layer 2 (Algorithms) of the U-Engine
//! ecosystem, depending only on `u-numflow` (Layer 1: Foundation) for
//! random number generation.

pub mod annealer;
pub mod covariance;
pub mod error;
pub mod minimize;
pub mod resample;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod temperature;

pub use error::{AnnealError, Result};
