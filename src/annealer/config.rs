//! Annealer configuration.

use crate::error::{AnnealError, Result};
use crate::scheduler::SchedulerConfig;

/// Configuration for a full annealing run.
///
/// # Examples
///
/// ```
/// use u_tmcmc::annealer::AnnealerConfig;
/// use u_tmcmc::scheduler::SchedulerConfig;
///
/// let config = AnnealerConfig::default()
///     .with_scheduler(SchedulerConfig::default().with_tolerance(1e-3))
///     .with_max_stages(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealerConfig {
    /// Per-stage configuration.
    pub scheduler: SchedulerConfig,

    /// Maximum number of stages before giving up on reaching β = 1.
    pub max_stages: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for AnnealerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            max_stages: 1000,
            seed: None,
        }
    }
}

impl AnnealerConfig {
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_max_stages(mut self, n: usize) -> Self {
        self.max_stages = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_stages == 0 {
            return Err(AnnealError::config("max_stages must be at least 1"));
        }
        self.scheduler.validate()
    }
}
