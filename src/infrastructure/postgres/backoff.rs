//! Exponential backoff for startup connectivity retries

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Exponential backoff configuration
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the second attempt, in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential growth
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl From<&RetryConfig> for BackoffConfig {
    fn from(retry: &RetryConfig) -> Self {
        Self {
            initial_delay_ms: retry.initial_delay_ms,
            max_delay_ms: retry.max_delay_ms,
            multiplier: 2.0,
            jitter_factor: retry.jitter_factor.clamp(0.0, 1.0),
        }
    }
}

/// Exponential backoff calculator.
///
/// The delay after failed attempt `n` (1-indexed) is
/// `initial_delay_ms * multiplier^(n-1)`, capped at `max_delay_ms`.
pub struct ExponentialBackoff {
    config: BackoffConfig,
    attempt: u32,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with custom configuration
    pub fn with_config(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Delay that follows failed attempt `attempt` (1-indexed), without jitter.
    fn base_delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = self.config.initial_delay_ms as f64 * self.config.multiplier.powi(exponent);
        let capped = delay.min(self.config.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Get the next delay duration
    pub fn next_delay(&mut self) -> Duration {
        self.attempt += 1;
        let base_ms = self.base_delay_for(self.attempt).as_millis() as f64;

        // Apply jitter only if jitter_factor > 0
        let final_ms = if self.config.jitter_factor > 0.0 && base_ms > 0.0 {
            let jitter_range = base_ms * self.config.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..jitter_range);
            (base_ms + jitter).max(0.0)
        } else {
            base_ms
        };

        Duration::from_millis(final_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(initial_delay_ms: u64) -> ExponentialBackoff {
        ExponentialBackoff::with_config(BackoffConfig {
            initial_delay_ms,
            max_delay_ms: u64::MAX,
            multiplier: 2.0,
            jitter_factor: 0.0,
        })
    }

    #[test]
    fn test_delays_double_from_initial() {
        let mut backoff = exact(1000);

        let delays: Vec<u128> = (0..4).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000]);
        assert_eq!(backoff.next_delay(), Duration::from_millis(16_000));
    }

    #[test]
    fn test_base_delay_for_is_one_indexed() {
        let backoff = exact(250);
        assert_eq!(backoff.base_delay_for(1), Duration::from_millis(250));
        assert_eq!(backoff.base_delay_for(3), Duration::from_millis(1000));
        // attempt 0 behaves like the first attempt
        assert_eq!(backoff.base_delay_for(0), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff_caps_at_max() {
        let config = BackoffConfig {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            multiplier: 10.0,
            jitter_factor: 0.0,
        };
        let mut backoff = ExponentialBackoff::with_config(config);

        for _ in 0..5 {
            backoff.next_delay();
        }

        let delay = backoff.next_delay();
        assert_eq!(delay.as_millis(), 5000);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let config = BackoffConfig {
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
            multiplier: 2.0,
            jitter_factor: 0.1,
        };
        let mut backoff = ExponentialBackoff::with_config(config);

        let delay = backoff.next_delay().as_millis();
        assert!((900..=1100).contains(&delay));
    }

    #[test]
    fn test_from_retry_config() {
        let retry = RetryConfig::default();
        let config = BackoffConfig::from(&retry);
        assert_eq!(config.initial_delay_ms, 1000);
        assert_eq!(config.multiplier, 2.0);
        assert_eq!(config.jitter_factor, 0.0);
    }
}
