//! Tabu Search configuration.

use crate::error::ConfigError;

/// How a drawn position pair transforms the current permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NeighborhoodStrategy {
    /// Exchange the values at the two positions.
    #[default]
    Swap,
    /// Reverse the span between the two positions, inclusive.
    Reverse,
    /// Per candidate, swap with probability
    /// [`TabuConfig::swap_probability`], otherwise reverse.
    Adhoc,
}

/// Configuration parameters for the QAP tabu search.
///
/// # Examples
///
/// ```
/// use qap_tabu::tabu::{NeighborhoodStrategy, TabuConfig};
///
/// let config = TabuConfig::default()
///     .with_max_iterations(2000)
///     .with_tenure(8)
///     .with_strategy(NeighborhoodStrategy::Adhoc)
///     .with_frequency_escalation(true)
///     .with_seed(7);
/// assert_eq!(config.max_iterations, 2000);
/// assert_eq!(config.tenure, 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TabuConfig {
    /// How many iterations a chosen move stays forbidden.
    pub tenure: usize,
    /// Iteration budget. The run terminates once the iteration counter
    /// reaches this value.
    pub max_iterations: usize,
    /// Number of candidates sampled per iteration.
    pub batch_size: usize,
    /// Neighborhood transform.
    pub strategy: NeighborhoodStrategy,
    /// Escalate the tenure of moves that are forbidden too often.
    pub frequency_escalation: bool,
    /// Probability of a swap (vs. a reverse) under
    /// [`NeighborhoodStrategy::Adhoc`].
    pub swap_probability: f64,
    /// Redraw budget per candidate slot before falling back to the taboo
    /// move closest to expiry. `None` retries forever.
    pub max_redraws: Option<usize>,
    /// Random seed (None for fresh entropy).
    pub seed: Option<u64>,
    /// Wall-clock limit for [`SearchEngine::run`](super::SearchEngine::run).
    pub time_limit_ms: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure: 5,
            max_iterations: 1000,
            batch_size: 5,
            strategy: NeighborhoodStrategy::Swap,
            frequency_escalation: false,
            swap_probability: 0.8,
            max_redraws: Some(10_000),
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu tenure (number of iterations a move remains tabu).
    pub fn with_tenure(mut self, tenure: usize) -> Self {
        self.tenure = tenure;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the number of candidates sampled per iteration.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_strategy(mut self, strategy: NeighborhoodStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_frequency_escalation(mut self, enabled: bool) -> Self {
        self.frequency_escalation = enabled;
        self
    }

    pub fn with_swap_probability(mut self, p: f64) -> Self {
        self.swap_probability = p;
        self
    }

    pub fn with_max_redraws(mut self, limit: Option<usize>) -> Self {
        self.max_redraws = limit;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the instance-independent parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenure == 0 {
            return Err(ConfigError::ZeroTenure);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !(0.0..=1.0).contains(&self.swap_probability) {
            return Err(ConfigError::SwapProbability(self.swap_probability));
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.max_redraws == Some(0) {
            return Err(ConfigError::ZeroRedraws);
        }
        Ok(())
    }

    /// Validates the configuration against an instance of size `n`.
    ///
    /// A batch needs `batch_size` distinct position pairs, so the instance
    /// must have at least two positions and `n(n-1)/2 >= batch_size`.
    pub fn validate_for(&self, n: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if n < 2 {
            return Err(ConfigError::TooSmall(n));
        }
        let pairs = n * (n - 1) / 2;
        if self.batch_size > pairs {
            return Err(ConfigError::BatchTooLarge {
                batch_size: self.batch_size,
                pairs,
                n,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabu_config_defaults() {
        let config = TabuConfig::default();
        assert_eq!(config.tenure, 5);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.strategy, NeighborhoodStrategy::Swap);
        assert!(!config.frequency_escalation);
        assert!((config.swap_probability - 0.8).abs() < 1e-12);
        assert_eq!(config.max_redraws, Some(10_000));
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_tabu_config_builder() {
        let config = TabuConfig::default()
            .with_tenure(2)
            .with_max_iterations(50)
            .with_batch_size(3)
            .with_strategy(NeighborhoodStrategy::Reverse)
            .with_frequency_escalation(true)
            .with_swap_probability(0.5)
            .with_max_redraws(None)
            .with_seed(123)
            .with_time_limit_ms(250);

        assert_eq!(config.tenure, 2);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.strategy, NeighborhoodStrategy::Reverse);
        assert!(config.frequency_escalation);
        assert!((config.swap_probability - 0.5).abs() < 1e-12);
        assert_eq!(config.max_redraws, None);
        assert_eq!(config.seed, Some(123));
        assert_eq!(config.time_limit_ms, Some(250));
    }

    #[test]
    fn test_validate_ok() {
        assert!(TabuConfig::default().validate().is_ok());
        assert!(TabuConfig::default().validate_for(12).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parameters() {
        assert_eq!(
            TabuConfig::default().with_tenure(0).validate(),
            Err(ConfigError::ZeroTenure)
        );
        assert_eq!(
            TabuConfig::default().with_max_iterations(0).validate(),
            Err(ConfigError::ZeroIterations)
        );
        assert_eq!(
            TabuConfig::default().with_batch_size(0).validate(),
            Err(ConfigError::ZeroBatchSize)
        );
        assert_eq!(
            TabuConfig::default().with_time_limit_ms(0).validate(),
            Err(ConfigError::ZeroTimeLimit)
        );
        assert_eq!(
            TabuConfig::default().with_max_redraws(Some(0)).validate(),
            Err(ConfigError::ZeroRedraws)
        );
    }

    #[test]
    fn test_validate_bad_swap_probability() {
        let config = TabuConfig::default().with_swap_probability(1.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SwapProbability(_))
        ));
        let config = TabuConfig::default().with_swap_probability(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_for_small_instances() {
        let config = TabuConfig::default();
        assert_eq!(config.validate_for(1), Err(ConfigError::TooSmall(1)));
        // 4 positions give 6 pairs; 5 fit, 7 do not.
        assert!(config.validate_for(4).is_ok());
        assert_eq!(
            config.clone().with_batch_size(7).validate_for(4),
            Err(ConfigError::BatchTooLarge {
                batch_size: 7,
                pairs: 6,
                n: 4
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_partial_json() {
        let config: TabuConfig =
            serde_json::from_str(r#"{"tenure": 8, "strategy": "reverse"}"#).unwrap();
        assert_eq!(config.tenure, 8);
        assert_eq!(config.strategy, NeighborhoodStrategy::Reverse);
        assert_eq!(config.max_iterations, 1000);
    }
}
