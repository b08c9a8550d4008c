use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Exponential backoff with jitter for outbound LLM calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_base: f64,
    pub jitter_factor: f64,
    pub max_elapsed: Duration,
}

impl RetryPolicy {
    /// Delay before retrying after `attempt` (1-based) failed, with `jitter` in -1.0..=1.0
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base_ms = self.initial_delay.as_millis() as f64 * self.backoff_base.powi(exponent);
        let jittered_ms = base_ms * (1.0 + self.jitter_factor * jitter.clamp(-1.0, 1.0));
        let delay = Duration::from_millis(jittered_ms.max(0.0) as u64);
        std::cmp::min(delay, self.max_delay)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(-1.0..=1.0);
        self.delay_with_jitter(attempt, jitter)
    }

    pub fn should_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        attempt < self.max_attempts && elapsed < self.max_elapsed
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_delay: Duration::from_millis(cfg.initial_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            backoff_base: cfg.backoff_base,
            jitter_factor: cfg.jitter_factor,
            max_elapsed: Duration::from_secs(cfg.max_elapsed_secs),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&crate::config::Config::default().retry)
    }
}
