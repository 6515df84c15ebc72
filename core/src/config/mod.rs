mod load;
mod types;

pub use load::{get_skein_data_dir, load_default};
pub use types::{
    AppConfig, GateConfig, LoggingConfig, OutputConfig, RetryConfig, SchedulerConfig,
    DEFAULT_PLACEHOLDER,
};
