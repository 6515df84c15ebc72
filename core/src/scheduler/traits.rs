use std::time::Duration;

/// Retry policy seam. `max_attempts` counts total attempts (1 = no retries);
/// `next_delay` returns None once the budget is spent.
pub trait RetryStrategyPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn next_delay(&self, attempt: u32, error: &str) -> Option<Duration>;
    fn max_attempts(&self) -> u32;
    fn should_retry(&self, attempt: u32, error: &str) -> bool {
        attempt < self.max_attempts() && !self.is_fatal_error(error)
    }
    fn is_fatal_error(&self, _error: &str) -> bool {
        false
    }
}
