//! End-to-end engine runs: template substitution, function evaluation,
//! module chains, the security gate and the retry loop, observed through a
//! capturing renderer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use skein_core::config::AppConfig;
use skein_core::engine::{Engine, EngineOpts, ExecutionRecord, ItemStatus, WorkItem};
use skein_core::module::{ModuleOptions, ModulePlugin, ModuleRegistry};
use skein_core::scheduler::{CancelToken, RetryStrategyPlugin, RunStats};
use skein_core::sink::{FilterPredicate, RecordRenderer, ResultSink};

struct CaptureRenderer {
    records: Arc<Mutex<Vec<ExecutionRecord>>>,
}

impl RecordRenderer for CaptureRenderer {
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
        self.records.lock().unwrap().push(rec.clone());
        Vec::new()
    }
}

fn items(values: &[&str]) -> Vec<WorkItem> {
    values
        .iter()
        .enumerate()
        .map(|(index, v)| WorkItem {
            index,
            value: v.to_string(),
        })
        .collect()
}

async fn run_engine(
    cfg: AppConfig,
    opts: EngineOpts,
    registry: ModuleRegistry,
    retry: Option<Arc<dyn RetryStrategyPlugin>>,
    work: Vec<WorkItem>,
) -> (RunStats, Vec<ExecutionRecord>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = ResultSink::new(
        Box::new(CaptureRenderer {
            records: records.clone(),
        }),
        None,
        FilterPredicate::new(opts.filter.clone()),
        0,
    )
    .unwrap();

    let engine = Engine::new(cfg, opts, Arc::new(registry), retry, sink, CancelToken::new())
        .unwrap();
    let stats = engine.run(work).await.unwrap();

    let mut recs = records.lock().unwrap().clone();
    recs.sort_by_key(|r| r.index);
    (stats, recs)
}

#[tokio::test]
async fn shell_template_runs_once_per_item() {
    let opts = EngineOpts {
        template: Some("echo hi-{STRING}".to_string()),
        ..EngineOpts::default()
    };
    let (stats, recs) = run_engine(
        AppConfig::default(),
        opts,
        ModuleRegistry::new(),
        None,
        items(&["a", "b", "c"]),
    )
    .await;

    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].authoritative(), vec!["hi-a"]);
    assert_eq!(recs[2].authoritative(), vec!["hi-c"]);
}

#[tokio::test]
async fn direct_mode_evaluates_functions_without_a_shell() {
    let opts = EngineOpts {
        template: Some("md5({STRING})".to_string()),
        direct: true,
        ..EngineOpts::default()
    };
    let (stats, recs) = run_engine(
        AppConfig::default(),
        opts,
        ModuleRegistry::new(),
        None,
        items(&["hello"]),
    )
    .await;

    assert_eq!(stats.succeeded, 1);
    assert!(recs[0].command_output.is_none());
    assert_eq!(
        recs[0].function_output.as_deref(),
        Some("5d41402abc4b2a76b9719d911017c592")
    );
}

struct NothingStub;

#[async_trait]
impl ModulePlugin for NothingStub {
    fn name(&self) -> &str {
        "none"
    }
    fn category(&self) -> &str {
        "ext"
    }
    async fn run(&self, _opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        Ok(vec![])
    }
}

static DOWNSTREAM_CALLS: AtomicUsize = AtomicUsize::new(0);

struct DownstreamStub;

#[async_trait]
impl ModulePlugin for DownstreamStub {
    fn name(&self) -> &str {
        "count"
    }
    fn category(&self) -> &str {
        "clc"
    }
    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        DOWNSTREAM_CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(vec![opts.data.clone()])
    }
}

#[tokio::test]
async fn empty_chain_stage_short_circuits_downstream() {
    let mut registry = ModuleRegistry::new();
    registry.register("ext", "none", || Box::new(NothingStub));
    registry.register("clc", "count", || Box::new(DownstreamStub));

    let opts = EngineOpts {
        module_spec: Some("ext:none|clc:count".parse().unwrap()),
        ..EngineOpts::default()
    };
    let (stats, recs) =
        run_engine(AppConfig::default(), opts, registry, None, items(&["a.com"])).await;

    assert_eq!(stats.succeeded, 1);
    assert_eq!(recs[0].stages.len(), 1);
    assert!(recs[0].stages[0].results.is_empty());
    assert_eq!(DOWNSTREAM_CALLS.load(Ordering::SeqCst), 0);
}

struct TagStub;

#[async_trait]
impl ModulePlugin for TagStub {
    fn name(&self) -> &str {
        "tag"
    }
    fn category(&self) -> &str {
        "ext"
    }
    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        Ok(vec![format!("tag:{}", opts.data)])
    }
}

struct UpperStub;

#[async_trait]
impl ModulePlugin for UpperStub {
    fn name(&self) -> &str {
        "upper"
    }
    fn category(&self) -> &str {
        "ext"
    }
    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        Ok(vec![opts.data.to_uppercase()])
    }
}

#[tokio::test]
async fn fanout_feeds_every_stage_the_original_input() {
    let mut registry = ModuleRegistry::new();
    registry.register("ext", "tag", || Box::new(TagStub));
    registry.register("ext", "upper", || Box::new(UpperStub));

    let opts = EngineOpts {
        module_spec: Some("ext:tag|ext:upper".parse().unwrap()),
        fanout: true,
        ..EngineOpts::default()
    };
    let (_, recs) =
        run_engine(AppConfig::default(), opts, registry, None, items(&["ab"])).await;

    assert_eq!(recs[0].stages.len(), 2);
    assert_eq!(recs[0].stages[0].results, vec!["tag:ab"]);
    // The second stage saw "ab", not "tag:ab".
    assert_eq!(recs[0].stages[1].results, vec!["AB"]);
}

struct BrokenStub;

#[async_trait]
impl ModulePlugin for BrokenStub {
    fn name(&self) -> &str {
        "broken"
    }
    fn category(&self) -> &str {
        "clc"
    }
    async fn run(&self, _opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("resolver unreachable")
    }
}

#[tokio::test]
async fn chained_module_error_fails_the_item() {
    let mut registry = ModuleRegistry::new();
    registry.register("clc", "broken", || Box::new(BrokenStub));
    registry.register("clc", "count", || Box::new(DownstreamStub));

    let opts = EngineOpts {
        module_spec: Some("clc:broken|clc:count".parse().unwrap()),
        ..EngineOpts::default()
    };
    let (stats, recs) =
        run_engine(AppConfig::default(), opts, registry, None, items(&["a.com"])).await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(recs[0].status, ItemStatus::FailedTerminal);
    assert!(recs[0].error.as_deref().unwrap().contains("resolver unreachable"));
    assert!(recs[0].stages[0].error.is_some());
}

struct EagerRetry;

impl RetryStrategyPlugin for EagerRetry {
    fn name(&self) -> &str {
        "eager"
    }
    fn next_delay(&self, attempt: u32, _error: &str) -> Option<Duration> {
        (attempt < self.max_attempts()).then(|| Duration::from_millis(1))
    }
    fn max_attempts(&self) -> u32 {
        3
    }
}

#[tokio::test]
async fn failing_command_exhausts_the_retry_budget() {
    let opts = EngineOpts {
        template: Some("exit 7".to_string()),
        ..EngineOpts::default()
    };
    let (stats, recs) = run_engine(
        AppConfig::default(),
        opts,
        ModuleRegistry::new(),
        Some(Arc::new(EagerRetry)),
        items(&["x"]),
    )
    .await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.retried, 2);
    assert_eq!(recs[0].attempts, 3);
    assert_eq!(recs[0].status, ItemStatus::FailedTerminal);
    assert!(recs[0].error.as_deref().unwrap().contains("exit code 7"));
}

#[tokio::test]
async fn dangerous_rendered_command_is_blocked_not_run() {
    let opts = EngineOpts {
        template: Some("rm -rf {STRING}".to_string()),
        ..EngineOpts::default()
    };
    let (stats, recs) = run_engine(
        AppConfig::default(),
        opts,
        ModuleRegistry::new(),
        None,
        items(&["/"]),
    )
    .await;

    assert_eq!(stats.blocked, 1);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(recs[0].status, ItemStatus::Blocked);
    assert!(recs[0].command_output.is_none());
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_work() {
    let mut cfg = AppConfig::default();
    cfg.gate.max_items = 2;

    let opts = EngineOpts {
        template: Some("echo {STRING}".to_string()),
        ..EngineOpts::default()
    };
    let sink = ResultSink::new(
        Box::new(CaptureRenderer {
            records: Arc::new(Mutex::new(Vec::new())),
        }),
        None,
        FilterPredicate::none(),
        0,
    )
    .unwrap();
    let engine = Engine::new(
        cfg,
        opts,
        Arc::new(ModuleRegistry::new()),
        None,
        sink,
        CancelToken::new(),
    )
    .unwrap();

    let err = engine.run(items(&["a", "b", "c"])).await.unwrap_err();
    assert!(err.to_string().contains("security gate"));
}

#[tokio::test]
async fn filter_drops_items_before_execution() {
    let opts = EngineOpts {
        template: Some("echo {STRING}".to_string()),
        filter: Some(".org".to_string()),
        ..EngineOpts::default()
    };
    let (stats, recs) = run_engine(
        AppConfig::default(),
        opts,
        ModuleRegistry::new(),
        None,
        items(&["a.org", "b.com", "c.org"]),
    )
    .await;

    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.filtered, 1);
    let dropped = recs.iter().find(|r| r.item == "b.com").unwrap();
    assert_eq!(dropped.status, ItemStatus::Filtered);
    assert!(dropped.command_output.is_none());
}

#[tokio::test]
async fn precancelled_run_dispatches_nothing() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = ResultSink::new(
        Box::new(CaptureRenderer {
            records: records.clone(),
        }),
        None,
        FilterPredicate::none(),
        0,
    )
    .unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();

    let opts = EngineOpts {
        template: Some("echo {STRING}".to_string()),
        ..EngineOpts::default()
    };
    let engine = Engine::new(
        AppConfig::default(),
        opts,
        Arc::new(ModuleRegistry::new()),
        None,
        sink,
        cancel,
    )
    .unwrap();

    let stats = engine.run(items(&["a", "b"])).await.unwrap();
    assert!(stats.cancelled);
    assert_eq!(stats.succeeded, 0);
    assert!(records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_module_fails_construction() {
    let sink = ResultSink::new(
        Box::new(CaptureRenderer {
            records: Arc::new(Mutex::new(Vec::new())),
        }),
        None,
        FilterPredicate::none(),
        0,
    )
    .unwrap();

    let opts = EngineOpts {
        module_spec: Some("ext:missing".parse().unwrap()),
        ..EngineOpts::default()
    };
    let err = Engine::new(
        AppConfig::default(),
        opts,
        Arc::new(ModuleRegistry::new()),
        None,
        sink,
        CancelToken::new(),
    )
    .err()
    .unwrap();
    assert!(err.to_string().contains("unknown module"));
}
