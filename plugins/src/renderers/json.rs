use skein_core::engine::ExecutionRecord;
use skein_core::sink::RecordRenderer;

use super::status_label;

/// One JSON object per record, machine-readable and order-independent.
/// No run summary is emitted so the stream stays parseable line by line.
pub struct JsonRenderer;

impl RecordRenderer for JsonRenderer {
    fn name(&self) -> &str {
        "json-renderer"
    }

    fn format(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn render(&self, rec: &ExecutionRecord) -> Vec<String> {
        let stages: Vec<_> = rec
            .stages
            .iter()
            .map(|s| {
                serde_json::json!({
                    "label": s.label,
                    "results": s.results,
                    "error": s.error,
                })
            })
            .collect();

        let obj = serde_json::json!({
            "index": rec.index,
            "item": rec.item,
            "status": status_label(rec.status),
            "attempts": rec.attempts,
            "duration_ms": rec.duration_ms,
            "results": rec.authoritative(),
            "stages": stages,
            "error": rec.error,
        });
        vec![obj.to_string()]
    }
}
