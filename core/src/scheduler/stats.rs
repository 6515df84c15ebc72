use serde::Serialize;

/// Run-wide counters mutated only by the scheduler under its own lock and
/// read by the result sink at shutdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: u64,
    pub failed: u64,
    pub retried: u64,
    pub filtered: u64,
    pub blocked: u64,
    pub cancelled: bool,
    pub duration_ms: u64,
    /// Last work item in flight when cancellation hit, for diagnostics.
    pub last_in_flight: Option<String>,
}

impl RunStats {
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} items: {} succeeded, {} failed, {} retried, {} filtered, {} blocked ({}ms)",
            self.total,
            self.succeeded,
            self.failed,
            self.retried,
            self.filtered,
            self.blocked,
            self.duration_ms
        );
        if self.cancelled {
            line.push_str(" [cancelled");
            if let Some(item) = &self.last_in_flight {
                line.push_str(&format!(", last in flight: {item}"));
            }
            line.push(']');
        }
        line
    }
}
