use skein_core::engine::ExecutionRecord;
use skein_core::sink::RecordRenderer;

use super::status_label;

/// Tab-delimited rows with a one-time header, one row per result line.
pub struct TableRenderer;

impl RecordRenderer for TableRenderer {
    fn name(&self) -> &str {
        "table-renderer"
    }

    fn format(&self) -> &str {
        "table"
    }

    fn file_extension(&self) -> &str {
        "tsv"
    }

    fn header(&self) -> Option<String> {
        Some("INDEX\tITEM\tSTATUS\tATTEMPTS\tDURATION_MS\tRESULT".to_string())
    }

    fn render(&self, rec: &ExecutionRecord) -> Vec<String> {
        let results = rec.authoritative();
        let prefix = format!(
            "{}\t{}\t{}\t{}\t{}",
            rec.index,
            rec.item,
            status_label(rec.status),
            rec.attempts,
            rec.duration_ms
        );
        if results.is_empty() {
            return vec![format!("{prefix}\t")];
        }
        results.into_iter().map(|r| format!("{prefix}\t{r}")).collect()
    }
}
