//! Temperature search.
//!
//! Chooses how far to advance the inverse temperature β so that the
//! importance weights `wᵢ ∝ exp(δ · llkᵢ)` of the next stage have a
//! prescribed coefficient of variation (CoV). A CoV near 1 keeps the
//! effective sample size around half the population, which balances the
//! number of stages against particle degeneracy.
//!
//! # Key Types
//!
//! - [`SearchConfig`]: target CoV, tolerance, iteration budget, initial guess
//! - [`CovObjective`]: `δ ↦ (CoV(δ) - target)²` with cached weights
//! - [`TemperatureSearch`]: fast path to β = 1, otherwise a Brent search
//! - [`SearchOutcome`]: the chosen δ with matching weights and CoV
//! - [`SearchObserver`]: per-iteration diagnostics sink
//!
//! # References
//!
//! - Ching & Chen (2007), "Transitional Markov Chain Monte Carlo Method for
//!   Bayesian Model Updating, Model Class Selection, and Model Averaging"
//! - Minson, Simons & Beck (2013), "Bayesian inversion for finite fault
//!   earthquake source models I — theory and algorithm" (CATMIP)

mod config;
mod objective;
mod search;
mod trace;

pub use config::SearchConfig;
pub use objective::{CovObjective, DEGENERATE_METRIC};
pub use search::{SearchOutcome, TemperatureSearch};
pub use trace::{NoopObserver, SearchObserver, SearchTrace, TraceRecorder};
