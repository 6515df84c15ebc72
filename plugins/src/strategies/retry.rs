use std::time::Duration;

use skein_core::config::RetryConfig;
use skein_core::scheduler::RetryStrategyPlugin;

/// Faults that another attempt cannot fix: the command was rejected or never
/// started at all, as opposed to running and exiting non-zero.
fn is_unstartable(error: &str) -> bool {
    error.starts_with("spawn failed")
        || error.starts_with("config error")
        || error.starts_with("blocked by security gate")
}

fn capped(cfg: &RetryConfig, delay_ms: u64) -> Duration {
    Duration::from_millis(delay_ms.min(cfg.max_delay_ms))
}

/// Waits `base * (attempt + 1)` between attempts, capped at `max_delay_ms`.
pub struct LinearRetryPlugin {
    cfg: RetryConfig,
}

impl LinearRetryPlugin {
    pub fn new(cfg: RetryConfig) -> Self {
        Self { cfg }
    }
}

impl RetryStrategyPlugin for LinearRetryPlugin {
    fn name(&self) -> &str {
        "linear"
    }

    fn next_delay(&self, attempt: u32, _error: &str) -> Option<Duration> {
        if attempt >= self.cfg.max_attempts {
            return None;
        }
        let step = u64::from(attempt) + 1;
        Some(capped(&self.cfg, self.cfg.base_delay_ms.saturating_mul(step)))
    }

    fn max_attempts(&self) -> u32 {
        self.cfg.max_attempts
    }

    fn is_fatal_error(&self, error: &str) -> bool {
        is_unstartable(error)
    }
}

/// Doubles the wait on every attempt, capped at `max_delay_ms`.
pub struct ExponentialBackoffPlugin {
    cfg: RetryConfig,
}

impl ExponentialBackoffPlugin {
    pub fn new(cfg: RetryConfig) -> Self {
        Self { cfg }
    }
}

impl RetryStrategyPlugin for ExponentialBackoffPlugin {
    fn name(&self) -> &str {
        "exponential-backoff"
    }

    fn next_delay(&self, attempt: u32, _error: &str) -> Option<Duration> {
        if attempt >= self.cfg.max_attempts {
            return None;
        }
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Some(capped(
            &self.cfg,
            self.cfg.base_delay_ms.saturating_mul(factor),
        ))
    }

    fn max_attempts(&self) -> u32 {
        self.cfg.max_attempts
    }

    fn is_fatal_error(&self, error: &str) -> bool {
        is_unstartable(error)
    }
}
