//! Annealing driver.
//!
//! Repeats stage transitions until β reaches 1. Between stages the
//! population is handed to a user-supplied [`ChainSampler`], which runs the
//! Markov chains that decorrelate the resampled replicas at the new β.
//!
//! # Key Types
//!
//! - [`ChainSampler`]: the Markov chain step (implemented by the user)
//! - [`AnnealerConfig`]: stage budget, seed and per-stage configuration
//! - [`Annealer`]: runs the loop
//! - [`AnnealResult`]: final state plus per-stage history

mod config;
mod runner;
mod types;

pub use config::AnnealerConfig;
pub use runner::{AnnealResult, Annealer, StageRecord};
pub use types::{ChainSampler, ChainStats};
