//! Scheduler configuration.

use crate::covariance::Conditioning;
use crate::error::Result;
use crate::resample::ResamplingScheme;
use crate::temperature::SearchConfig;

/// Configuration for one annealing stage.
///
/// # Examples
///
/// ```
/// use u_tmcmc::covariance::Conditioning;
/// use u_tmcmc::resample::ResamplingScheme;
/// use u_tmcmc::scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::default()
///     .with_target_cov(1.0)
///     .with_tolerance(1e-3)
///     .with_max_iterations(100)
///     .with_conditioning(Conditioning::RelativeJitter(1e-9))
///     .with_scheme(ResamplingScheme::Multinomial);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// β increment search parameters.
    pub search: SearchConfig,

    /// Post-processing of the proposal covariance.
    pub conditioning: Conditioning,

    /// How replica counts are drawn.
    pub scheme: ResamplingScheme,
}

impl SchedulerConfig {
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_target_cov(mut self, target: f64) -> Self {
        self.search.target_cov = target;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.search.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.search.max_iterations = n;
        self
    }

    pub fn with_conditioning(mut self, conditioning: Conditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    pub fn with_scheme(mut self, scheme: ResamplingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.conditioning.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.conditioning, Conditioning::None);
        assert_eq!(config.scheme, ResamplingScheme::Multinomial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_reaches_search() {
        let config = SchedulerConfig::default()
            .with_target_cov(0.8)
            .with_tolerance(1e-2)
            .with_max_iterations(7);
        assert!((config.search.target_cov - 0.8).abs() < 1e-15);
        assert!((config.search.tolerance - 1e-2).abs() < 1e-15);
        assert_eq!(config.search.max_iterations, 7);
    }

    #[test]
    fn test_validate_propagates() {
        assert!(SchedulerConfig::default()
            .with_max_iterations(0)
            .validate()
            .is_err());
        assert!(SchedulerConfig::default()
            .with_conditioning(Conditioning::DiagonalJitter(f64::NAN))
            .validate()
            .is_err());
    }
}
