use crate::engine::ExecutionRecord;
use crate::scheduler::RunStats;

/// Output representation seam. Implementations live in skein-plugins and
/// must render incrementally: one record in, zero or more lines out.
pub trait RecordRenderer: Send + Sync {
    fn name(&self) -> &str;
    fn format(&self) -> &str;
    /// Extension used when deriving a timestamped default filename.
    fn file_extension(&self) -> &str;
    /// Optional header row written once before any record.
    fn header(&self) -> Option<String> {
        None
    }
    fn render(&self, rec: &ExecutionRecord) -> Vec<String>;
    /// Optional trailer written by `flush`.
    fn summary(&self, _stats: &RunStats) -> Option<String> {
        None
    }
}
