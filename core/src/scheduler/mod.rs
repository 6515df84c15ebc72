mod control;
mod pool;
mod progress;
mod stats;
mod traits;

pub use control::CancelToken;
pub use pool::run_pool;
pub use progress::ProgressMonitor;
pub use stats::RunStats;
pub use traits::RetryStrategyPlugin;
