mod patterns;

pub use patterns::match_dangerous;

use crate::config::GateConfig;

/// Outcome of a gate check. `reason` is set only when `allowed` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl GateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Pre-execution validator for batch ceilings and dangerous command patterns.
///
/// Stateless and side-effect-free: safe to call concurrently from any worker.
/// The size/count ceilings and the pattern signatures are independently
/// toggled; bypassing one leaves the other active.
#[derive(Debug, Clone)]
pub struct SecurityGate {
    config: GateConfig,
}

impl SecurityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Validate one rendered command against the batch it belongs to.
    ///
    /// Pass an empty `rendered_command` to run the batch-level size/count
    /// check alone (done once before any work is scheduled).
    pub fn validate(
        &self,
        batch_bytes: u64,
        item_count: usize,
        rendered_command: &str,
    ) -> GateDecision {
        if !self.config.skip_size_checks {
            if batch_bytes > self.config.max_batch_bytes {
                return GateDecision::deny(format!(
                    "batch size {} bytes exceeds ceiling of {} bytes",
                    batch_bytes, self.config.max_batch_bytes
                ));
            }
            if item_count > self.config.max_items {
                return GateDecision::deny(format!(
                    "item count {} exceeds ceiling of {}",
                    item_count, self.config.max_items
                ));
            }
        }

        if !self.config.allow_dangerous && !rendered_command.is_empty() {
            if let Some(label) = match_dangerous(rendered_command) {
                return GateDecision::deny(format!("dangerous pattern: {}", label));
            }
        }

        GateDecision::allow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(allow_dangerous: bool, skip_size_checks: bool) -> SecurityGate {
        SecurityGate::new(GateConfig {
            allow_dangerous,
            skip_size_checks,
            ..GateConfig::default()
        })
    }

    #[test]
    fn allows_ordinary_commands() {
        let d = gate(false, false).validate(100, 2, "echo a.com");
        assert!(d.allowed);
        assert!(d.reason.is_none());
    }

    #[test]
    fn denies_destructive_filesystem_command() {
        let d = gate(false, false).validate(100, 2, "rm -rf / --no-preserve-root");
        assert!(!d.allowed);
        assert!(d.reason.unwrap().contains("dangerous pattern"));
    }

    #[test]
    fn bypass_flag_disables_pattern_check_only() {
        let g = gate(true, false);
        assert!(g.validate(100, 2, "rm -rf /").allowed);
        // Size ceiling still applies with the pattern bypass on.
        assert!(!g.validate(10 * 1024 * 1024, 2, "rm -rf /").allowed);
    }

    #[test]
    fn size_bypass_disables_ceilings_only() {
        let g = gate(false, true);
        assert!(g.validate(10 * 1024 * 1024, 100_000, "echo hi").allowed);
        assert!(!g.validate(10 * 1024 * 1024, 100_000, "rm -rf /").allowed);
    }

    #[test]
    fn denies_oversized_batch() {
        let d = gate(false, false).validate(2 * 1024 * 1024, 2, "");
        assert!(!d.allowed);
        assert!(d.reason.unwrap().contains("batch size"));
    }

    #[test]
    fn denies_item_count_over_ceiling() {
        let d = gate(false, false).validate(100, 10_001, "");
        assert!(!d.allowed);
    }

    #[test]
    fn validation_is_idempotent() {
        let g = gate(false, false);
        let first = g.validate(512, 3, "cat /etc/hostname; rm -rf /tmp/x");
        let second = g.validate(512, 3, "cat /etc/hostname; rm -rf /tmp/x");
        assert_eq!(first, second);
    }
}
