//! Search configuration for the route planner.

use std::time::Duration;

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Largest target count solved by exhaustive enumeration.
    /// Larger requests use randomized local search.
    pub exact_threshold: usize,

    /// Iteration budget when the request does not give one.
    pub default_max_iterations: u64,

    /// Time budget in seconds when the request does not give one.
    pub default_time_limit_secs: f64,

    /// Random seed when the request does not give one.
    pub default_seed: u64,

    /// Number of iterations between wall-clock checks.
    pub time_check_interval: u64,

    /// Starting annealing temperature as a fraction of the initial cost.
    /// Zero disables acceptance of worsening moves.
    pub initial_temperature_ratio: f64,

    /// Per-iteration geometric cooling factor, in (0, 1].
    pub cooling_rate: f64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        exact_threshold: usize,
        default_max_iterations: u64,
        default_time_limit_secs: f64,
        default_seed: u64,
        time_check_interval: u64,
        initial_temperature_ratio: f64,
        cooling_rate: f64,
    ) -> Self {
        Self {
            exact_threshold,
            default_max_iterations,
            default_time_limit_secs,
            default_seed,
            time_check_interval,
            initial_temperature_ratio,
            cooling_rate,
        }
    }

    /// Returns the default time limit as a Duration.
    pub fn default_time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.default_time_limit_secs)
    }

    /// Annealing temperature after `iteration` local-search steps.
    pub fn temperature(&self, initial_cost: f64, iteration: u64) -> f64 {
        let exponent = iteration.min(i32::MAX as u64) as i32;
        self.initial_temperature_ratio * initial_cost * self.cooling_rate.powi(exponent)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 8,
            default_max_iterations: 200_000,
            default_time_limit_secs: 10.0,
            default_seed: 0x5eed,
            time_check_interval: 1,
            initial_temperature_ratio: 0.05,
            cooling_rate: 0.995,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.exact_threshold, 8);
        assert_eq!(config.default_max_iterations, 200_000);
        assert_eq!(config.default_time_limit_secs, 10.0);
        assert_eq!(config.time_check_interval, 1);
        assert_eq!(config.initial_temperature_ratio, 0.05);
        assert_eq!(config.cooling_rate, 0.995);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();
        assert_eq!(config.default_time_limit(), Duration::from_secs(10));
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(5, 1000, 2.5, 42, 16, 0.0, 1.0);

        assert_eq!(config.exact_threshold, 5);
        assert_eq!(config.default_max_iterations, 1000);
        assert_eq!(config.default_time_limit(), Duration::from_millis(2500));
        assert_eq!(config.default_seed, 42);
        assert_eq!(config.time_check_interval, 16);
        assert_eq!(config.initial_temperature_ratio, 0.0);
        assert_eq!(config.cooling_rate, 1.0);
    }

    #[test]
    fn temperature_cools_geometrically() {
        let config = SearchConfig::new(8, 1000, 1.0, 0, 1, 0.1, 0.5);
        assert_eq!(config.temperature(100.0, 0), 10.0);
        assert_eq!(config.temperature(100.0, 1), 5.0);
        assert_eq!(config.temperature(100.0, 3), 1.25);
    }
}
