use std::collections::HashMap;

use crate::module::{chain_result, ModuleSpec, StageOutput};

/// One unit of input flowing through the pipeline. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Succeeded,
    FailedTerminal,
    Filtered,
    Blocked,
}

/// Everything produced for one work item. At most one authoritative output
/// is selected for display depending on which paths ran.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub index: usize,
    pub item: String,
    /// Raw subprocess stdout, when a shell command ran.
    pub command_output: Option<String>,
    /// Function-evaluator output, when the template contained functions.
    pub function_output: Option<String>,
    /// Per-stage module output, when a module spec was present.
    pub stages: Vec<StageOutput>,
    pub status: ItemStatus,
    pub attempts: u32,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// The strings a line-oriented consumer should see for this item:
    /// module output when modules ran, else function output in direct mode,
    /// else the raw command output.
    pub fn authoritative(&self) -> Vec<String> {
        if !self.stages.is_empty() {
            return chain_result(&self.stages);
        }
        if let Some(f) = &self.function_output {
            return vec![f.clone()];
        }
        if let Some(c) = &self.command_output {
            return c
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| l.to_string())
                .collect();
        }
        Vec::new()
    }
}

/// Per-run options resolved from CLI flags and config.
#[derive(Debug, Clone, Default)]
pub struct EngineOpts {
    pub template: Option<String>,
    pub module_spec: Option<ModuleSpec>,
    /// Fan-out module mode: original input re-applied at every stage.
    pub fanout: bool,
    /// No-shell mode: never spawn a subprocess.
    pub direct: bool,
    pub pipe_command: Option<String>,
    pub filter: Option<String>,
    pub proxy: Option<String>,
    pub module_extra: HashMap<String, String>,
    pub progress: bool,
}
