//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Delay schedule between upstream attempts.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }

    /// Delay without jitter after the given (1-based) failed attempt.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u64.saturating_pow(attempt - 1);
        Duration::from_millis(self.base_ms.saturating_mul(factor).min(self.max_ms))
    }

    /// Delay with up to 10% jitter added on top.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let jitter_range = base.as_millis() as u64 / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };
        base + Duration::from_millis(jitter)
    }
}
