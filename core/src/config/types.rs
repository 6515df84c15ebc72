use serde::{Deserialize, Serialize};

/// Reserved marker replaced by the current work item's value.
pub const DEFAULT_PLACEHOLDER: &str = "{STRING}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Placeholder token substituted into templates.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            logging: LoggingConfig::default(),
            gate: GateConfig::default(),
            scheduler: SchedulerConfig::default(),
            retry: RetryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "skein_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Security gate ceilings and bypass toggles.
///
/// Size/count protection and pattern protection are independent: disabling
/// one leaves the other active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Total input byte ceiling for one batch.
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: u64,

    /// Work item count ceiling for one batch.
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Skip dangerous-pattern signature matching.
    #[serde(default)]
    pub allow_dangerous: bool,

    /// Skip the size/count ceilings.
    #[serde(default)]
    pub skip_size_checks: bool,
}

fn default_max_batch_bytes() -> u64 {
    1024 * 1024
}

fn default_max_items() -> usize {
    10_000
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_batch_bytes: default_max_batch_bytes(),
            max_items: default_max_items(),
            allow_dangerous: false,
            skip_size_checks: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Bounded worker pool size.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Fixed delay before each dispatch, per worker (rate limiting).
    #[serde(default)]
    pub dispatch_delay_ms: u64,

    /// Per-item subprocess timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Grace period granted to in-flight work after cancellation.
    #[serde(default = "default_grace_ms")]
    pub cancel_grace_ms: u64,
}

fn default_workers() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_grace_ms() -> u64 {
    2_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            dispatch_delay_ms: 0,
            timeout_secs: default_timeout_secs(),
            cancel_grace_ms: default_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_strategy")]
    pub strategy: String,

    #[serde(default = "default_retry_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay")]
    pub max_delay_ms: u64,

    /// Total attempts per item (1 = no retries).
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,
}

fn default_retry_strategy() -> String {
    "linear".to_string()
}

fn default_retry_base_delay() -> u64 {
    100
}

fn default_retry_max_delay() -> u64 {
    5_000
}

fn default_retry_attempts() -> u32 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: default_retry_strategy(),
            base_delay_ms: default_retry_base_delay(),
            max_delay_ms: default_retry_max_delay(),
            max_attempts: default_retry_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output representation: "text", "table" or "json".
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Buffer out-of-order completions until the gap closes, up to this many
    /// records. 0 disables ordering.
    #[serde(default)]
    pub ordered_window: usize,
}

fn default_output_format() -> String {
    "text".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            ordered_window: 0,
        }
    }
}
