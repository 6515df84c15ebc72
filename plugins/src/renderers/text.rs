use skein_core::engine::{ExecutionRecord, ItemStatus};
use skein_core::scheduler::RunStats;
use skein_core::sink::RecordRenderer;

use super::status_label;

/// Line-per-result output. In verbose mode every line is prefixed with the
/// originating work item, and non-success items get a diagnostic comment.
pub struct TextRenderer {
    verbose: bool,
}

impl TextRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl RecordRenderer for TextRenderer {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn format(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn render(&self, rec: &ExecutionRecord) -> Vec<String> {
        let mut lines = Vec::new();
        for result in rec.authoritative() {
            if self.verbose {
                lines.push(format!("{}: {}", rec.item, result));
            } else {
                lines.push(result);
            }
        }
        if self.verbose && rec.status != ItemStatus::Succeeded {
            let mut note = format!("# {}: {}", rec.item, status_label(rec.status));
            if let Some(err) = &rec.error {
                note.push_str(&format!(" ({err})"));
            }
            lines.push(note);
        }
        lines
    }

    fn summary(&self, stats: &RunStats) -> Option<String> {
        Some(format!("# {}", stats.summary_line()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(results: &str) -> ExecutionRecord {
        ExecutionRecord {
            index: 0,
            item: "a.com".into(),
            command_output: Some(results.into()),
            function_output: None,
            stages: vec![],
            status: ItemStatus::Succeeded,
            attempts: 1,
            duration_ms: 3,
            error: None,
        }
    }

    #[test]
    fn plain_mode_emits_bare_results() {
        let lines = TextRenderer::new(false).render(&record("one\ntwo\n"));
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn verbose_mode_prefixes_with_item() {
        let lines = TextRenderer::new(true).render(&record("one\n"));
        assert_eq!(lines, vec!["a.com: one"]);
    }

    #[test]
    fn verbose_mode_notes_failures() {
        let mut rec = record("");
        rec.status = ItemStatus::FailedTerminal;
        rec.error = Some("exit code 1".into());
        let lines = TextRenderer::new(true).render(&rec);
        assert_eq!(lines, vec!["# a.com: failed (exit code 1)"]);
    }
}
