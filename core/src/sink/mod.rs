//! Filters, formats, and persists execution records.
//!
//! The sink owns its output handle exclusively and serializes all writes.
//! Records are written incrementally; nothing is buffered whole-run except
//! the bounded reordering window.

mod filter;
mod render;

pub use filter::FilterPredicate;
pub use render::RecordRenderer;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::engine::ExecutionRecord;
use crate::error::EngineError;
use crate::scheduler::RunStats;

enum SinkWriter {
    Stdout(std::io::Stdout),
    File(BufWriter<File>),
}

impl SinkWriter {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => writeln!(out, "{line}"),
            SinkWriter::File(f) => writeln!(f, "{line}"),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => out.flush(),
            SinkWriter::File(f) => f.flush(),
        }
    }
}

pub struct ResultSink {
    renderer: Box<dyn RecordRenderer>,
    writer: SinkWriter,
    filter: FilterPredicate,
    /// Completion order is not input order; when > 0, buffer out-of-order
    /// records until the gap closes, up to this many.
    ordered_window: usize,
    buffer: BTreeMap<usize, ExecutionRecord>,
    next_index: usize,
}

impl ResultSink {
    pub fn new(
        renderer: Box<dyn RecordRenderer>,
        destination: Option<&Path>,
        filter: FilterPredicate,
        ordered_window: usize,
    ) -> Result<Self, EngineError> {
        let mut writer = match destination {
            Some(path) => SinkWriter::File(BufWriter::new(File::create(path)?)),
            None => SinkWriter::Stdout(std::io::stdout()),
        };
        if let Some(header) = renderer.header() {
            writer.write_line(&header)?;
        }
        Ok(Self {
            renderer,
            writer,
            filter,
            ordered_window,
            buffer: BTreeMap::new(),
            next_index: 0,
        })
    }

    /// Derive a destination from the current date/time so repeated runs
    /// never silently overwrite each other.
    pub fn default_destination(extension: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        PathBuf::from(format!("skein-{stamp}.{extension}"))
    }

    pub fn record(&mut self, mut rec: ExecutionRecord) -> Result<(), EngineError> {
        // Partial results failing the predicate are dropped, not retried.
        for stage in &mut rec.stages {
            stage.results.retain(|r| self.filter.accepts(r));
        }

        if self.ordered_window == 0 {
            return self.write_record(&rec);
        }

        self.buffer.insert(rec.index, rec);
        self.drain_ready()
    }

    fn drain_ready(&mut self) -> Result<(), EngineError> {
        loop {
            while let Some(rec) = self.buffer.remove(&self.next_index) {
                self.write_record(&rec)?;
                self.next_index += 1;
            }
            if self.buffer.len() <= self.ordered_window {
                return Ok(());
            }
            // The window is full and the gap has not closed: emit the lowest
            // buffered record out of order rather than stalling the run.
            let (&idx, _) = self.buffer.iter().next().expect("buffer not empty");
            let rec = self.buffer.remove(&idx).expect("checked above");
            tracing::warn!("ordering window exceeded, emitting item {} out of order", idx);
            self.write_record(&rec)?;
            self.next_index = idx + 1;
        }
    }

    fn write_record(&mut self, rec: &ExecutionRecord) -> Result<(), EngineError> {
        for line in self.renderer.render(rec) {
            self.writer.write_line(&line)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Drain any buffered out-of-order records and write the run summary.
    pub fn flush(&mut self, stats: &RunStats) -> Result<(), EngineError> {
        let remaining: Vec<_> = std::mem::take(&mut self.buffer).into_values().collect();
        for rec in remaining {
            self.write_record(&rec)?;
        }
        if let Some(summary) = self.renderer.summary(stats) {
            self.writer.write_line(&summary)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ExecutionRecord, ItemStatus};
    use crate::module::StageOutput;
    use std::sync::{Arc, Mutex};

    /// Renders into a shared vector so tests can observe write order.
    struct CapturingRenderer {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl RecordRenderer for CapturingRenderer {
        fn name(&self) -> &str {
            "capture"
        }
        fn format(&self) -> &str {
            "text"
        }
        fn file_extension(&self) -> &str {
            "txt"
        }
        fn render(&self, rec: &ExecutionRecord) -> Vec<String> {
            let mut out = vec![format!("{}:{}", rec.index, rec.item)];
            for stage in &rec.stages {
                for r in &stage.results {
                    out.push(format!("  {r}"));
                }
            }
            self.lines.lock().unwrap().extend(out.clone());
            out
        }
        fn summary(&self, stats: &RunStats) -> Option<String> {
            Some(format!("# {}", stats.summary_line()))
        }
    }

    fn record(index: usize, item: &str) -> ExecutionRecord {
        ExecutionRecord {
            index,
            item: item.to_string(),
            command_output: None,
            function_output: None,
            stages: vec![],
            status: ItemStatus::Succeeded,
            attempts: 1,
            duration_ms: 0,
            error: None,
        }
    }

    fn sink_to_temp(
        ordered_window: usize,
        filter: FilterPredicate,
        lines: Arc<Mutex<Vec<String>>>,
    ) -> (ResultSink, tempfile::TempPath) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.into_temp_path();
        let sink = ResultSink::new(
            Box::new(CapturingRenderer { lines }),
            Some(&path),
            filter,
            ordered_window,
        )
        .unwrap();
        (sink, path)
    }

    #[test]
    fn ordered_window_closes_gaps() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let (mut sink, _path) = sink_to_temp(10, FilterPredicate::none(), lines.clone());

        sink.record(record(2, "c")).unwrap();
        sink.record(record(1, "b")).unwrap();
        assert!(lines.lock().unwrap().is_empty());

        sink.record(record(0, "a")).unwrap();
        let seen = lines.lock().unwrap().clone();
        assert_eq!(seen, vec!["0:a", "1:b", "2:c"]);
    }

    #[test]
    fn window_overflow_emits_out_of_order() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let (mut sink, _path) = sink_to_temp(1, FilterPredicate::none(), lines.clone());

        // Index 0 never arrives; the window holds one record.
        sink.record(record(1, "b")).unwrap();
        sink.record(record(2, "c")).unwrap();
        let seen = lines.lock().unwrap().clone();
        assert_eq!(seen, vec!["1:b", "2:c"]);
    }

    #[test]
    fn flush_drains_buffer_and_writes_summary() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let (mut sink, path) = sink_to_temp(10, FilterPredicate::none(), lines.clone());

        sink.record(record(1, "b")).unwrap();
        sink.flush(&RunStats::default()).unwrap();
        assert_eq!(lines.lock().unwrap().clone(), vec!["1:b"]);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("1:b"));
        assert!(contents.contains("# 0 items"));
    }

    #[test]
    fn filter_drops_nonmatching_stage_results() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let (mut sink, _path) =
            sink_to_temp(0, FilterPredicate::new(Some(".org".into())), lines.clone());

        let mut rec = record(0, "x");
        rec.stages = vec![StageOutput {
            index: 0,
            label: "stage 1/1: ext:domain".into(),
            results: vec!["test.org".into(), "test.com".into()],
            error: None,
        }];
        sink.record(rec).unwrap();

        let seen = lines.lock().unwrap().clone();
        assert_eq!(seen, vec!["0:x", "  test.org"]);
    }

    #[test]
    fn default_destination_is_timestamped() {
        let path = ResultSink::default_destination("txt");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("skein-"));
        assert!(name.ends_with(".txt"));
    }
}
