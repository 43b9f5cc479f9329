//! Stage orchestration.
//!
//! One annealing stage is a fixed sequence:
//! temperature search → covariance → resampling.
//! [`CovScheduler`] runs that sequence against a caller-owned
//! [`AnnealingState`](crate::state::AnnealingState); the loop over stages
//! lives outside (see [`annealer`](crate::annealer) for a ready-made one).

mod config;
mod runner;

pub use config::SchedulerConfig;
pub use runner::{CovScheduler, StageReport};
