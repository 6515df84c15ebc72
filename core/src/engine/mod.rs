//! Run orchestration: drives the gate, template, module, and executor
//! layers over every work item under the bounded scheduler.

mod types;

pub use types::{EngineOpts, ExecutionRecord, ItemStatus, WorkItem};

use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::EngineError;
use crate::exec::CommandExecutor;
use crate::gate::SecurityGate;
use crate::module::{ChainMode, ChainResolver, ModuleOptions, ModuleRegistry};
use crate::scheduler::{
    run_pool, CancelToken, ProgressMonitor, RetryStrategyPlugin, RunStats,
};
use crate::sink::{FilterPredicate, ResultSink};
use crate::template::TemplateEngine;

pub struct Engine {
    cfg: AppConfig,
    opts: EngineOpts,
    registry: Arc<ModuleRegistry>,
    retry: Option<Arc<dyn RetryStrategyPlugin>>,
    sink: Arc<Mutex<ResultSink>>,
    cancel: CancelToken,
}

/// Shared state cloned into every worker.
#[derive(Clone)]
struct WorkerCtx {
    opts: Arc<EngineOpts>,
    gate: Arc<SecurityGate>,
    template: Arc<TemplateEngine>,
    registry: Arc<ModuleRegistry>,
    executor: Arc<CommandExecutor>,
    retry: Option<Arc<dyn RetryStrategyPlugin>>,
    sink: Arc<Mutex<ResultSink>>,
    stats: Arc<StdMutex<RunStats>>,
    progress: Arc<ProgressMonitor>,
    last_in_flight: Arc<StdMutex<Option<String>>>,
    filter: FilterPredicate,
    batch_bytes: u64,
    item_count: usize,
}

impl Engine {
    /// Validates configuration up front: conflicting mode flags, an absent
    /// workload, or an unknown module are fatal before any work starts.
    pub fn new(
        cfg: AppConfig,
        opts: EngineOpts,
        registry: Arc<ModuleRegistry>,
        retry: Option<Arc<dyn RetryStrategyPlugin>>,
        sink: ResultSink,
        cancel: CancelToken,
    ) -> Result<Self, EngineError> {
        if opts.template.is_none() && opts.module_spec.is_none() {
            return Err(EngineError::Config(
                "nothing to do: supply a command template or a module spec".into(),
            ));
        }
        if opts.direct && opts.pipe_command.is_some() {
            return Err(EngineError::Config(
                "direct mode and a pipe command are mutually exclusive".into(),
            ));
        }
        if let Some(spec) = &opts.module_spec {
            registry.validate_spec(spec)?;
        }

        Ok(Self {
            cfg,
            opts,
            registry,
            retry,
            sink: Arc::new(Mutex::new(sink)),
            cancel,
        })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn run(&self, items: Vec<WorkItem>) -> Result<RunStats, EngineError> {
        let start = Instant::now();
        let batch_bytes: u64 = items.iter().map(|i| i.value.len() as u64).sum();
        let item_count = items.len();

        let gate = Arc::new(SecurityGate::new(self.cfg.gate.clone()));
        let batch = gate.validate(batch_bytes, item_count, "");
        if !batch.allowed {
            return Err(EngineError::Gate(batch.reason.unwrap_or_default()));
        }

        let stats = Arc::new(StdMutex::new(RunStats {
            total: item_count,
            ..RunStats::default()
        }));
        let progress = Arc::new(ProgressMonitor::new(item_count, self.opts.progress));

        let ctx = WorkerCtx {
            opts: Arc::new(self.opts.clone()),
            gate,
            template: Arc::new(TemplateEngine::new(self.cfg.placeholder.clone())),
            registry: self.registry.clone(),
            executor: Arc::new(CommandExecutor::new(Duration::from_secs(
                self.cfg.scheduler.timeout_secs,
            ))),
            retry: self.retry.clone(),
            sink: self.sink.clone(),
            stats: stats.clone(),
            progress: progress.clone(),
            last_in_flight: Arc::new(StdMutex::new(None)),
            filter: FilterPredicate::new(self.opts.filter.clone()),
            batch_bytes,
            item_count,
        };

        let dispatch_delay = match self.cfg.scheduler.dispatch_delay_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let worker_ctx = ctx.clone();
        let pool_fut = run_pool(
            items,
            self.cfg.scheduler.workers,
            dispatch_delay,
            self.cancel.clone(),
            move |item| {
                let ctx = worker_ctx.clone();
                async move { process_item(ctx, item).await }
            },
        );
        tokio::pin!(pool_fut);

        let cancel = self.cancel.clone();
        let grace = Duration::from_millis(self.cfg.scheduler.cancel_grace_ms);
        tokio::select! {
            _ = &mut pool_fut => {}
            _ = async {
                cancel.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!("grace period elapsed, abandoning in-flight work");
            }
        }

        let cancelled = self.cancel.is_cancelled();
        let mut final_stats = match stats.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        final_stats.cancelled = cancelled;
        final_stats.duration_ms = start.elapsed().as_millis() as u64;
        if cancelled {
            final_stats.last_in_flight = match ctx.last_in_flight.lock() {
                Ok(v) => v.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
        }

        progress.finish(cancelled);
        self.sink.lock().await.flush(&final_stats)?;
        tracing::info!("{}", final_stats.summary_line());

        Ok(final_stats)
    }
}

async fn process_item(ctx: WorkerCtx, item: WorkItem) {
    if let Ok(mut guard) = ctx.last_in_flight.lock() {
        *guard = Some(item.value.clone());
    }

    let started = Instant::now();
    let rec = build_record(&ctx, &item, started).await;

    let success = rec.status == ItemStatus::Succeeded;
    if let Ok(mut s) = ctx.stats.lock() {
        match rec.status {
            ItemStatus::Succeeded => s.succeeded += 1,
            ItemStatus::FailedTerminal => s.failed += 1,
            ItemStatus::Filtered => s.filtered += 1,
            ItemStatus::Blocked => s.blocked += 1,
        }
        s.retried += rec.attempts.saturating_sub(1) as u64;
    }
    ctx.progress.item_done(&item.value, success);

    if let Err(e) = ctx.sink.lock().await.record(rec) {
        tracing::error!("failed to record result for '{}': {}", item.value, e);
    }
}

async fn build_record(ctx: &WorkerCtx, item: &WorkItem, started: Instant) -> ExecutionRecord {
    let mut rec = ExecutionRecord {
        index: item.index,
        item: item.value.clone(),
        command_output: None,
        function_output: None,
        stages: Vec::new(),
        status: ItemStatus::Succeeded,
        attempts: 1,
        duration_ms: 0,
        error: None,
    };

    // Raw work items failing the predicate are dropped, not retried.
    if !ctx.filter.accepts(&item.value) {
        rec.status = ItemStatus::Filtered;
        return rec;
    }

    // The value handed to downstream paths: the evaluated template in
    // direct mode, otherwise the raw work item.
    let mut module_input = item.value.clone();

    if let Some(tpl) = &ctx.opts.template {
        let eval = ctx.template.evaluate(tpl, &item.value);
        if eval.had_functions {
            rec.function_output = Some(eval.expanded.clone());
            if !ctx.filter.accepts(&eval.expanded) {
                rec.status = ItemStatus::Filtered;
                rec.duration_ms = started.elapsed().as_millis() as u64;
                return rec;
            }
        }

        if ctx.opts.direct {
            module_input = eval.expanded.clone();
        } else {
            let decision = ctx
                .gate
                .validate(ctx.batch_bytes, ctx.item_count, &eval.expanded);
            if !decision.allowed {
                tracing::warn!(
                    "security gate blocked '{}': {}",
                    item.value,
                    decision.reason.as_deref().unwrap_or("unspecified")
                );
                rec.status = ItemStatus::Blocked;
                rec.error = decision.reason;
                rec.duration_ms = started.elapsed().as_millis() as u64;
                return rec;
            }

            let (output, attempts) = execute_with_retry(ctx, &eval.expanded).await;
            rec.attempts = attempts;
            match output {
                Ok(out) if out.success() => {
                    rec.command_output = Some(out.stdout);
                }
                Ok(out) => {
                    rec.command_output = Some(out.stdout);
                    rec.status = ItemStatus::FailedTerminal;
                    rec.error = Some(if out.stderr.is_empty() {
                        format!("exit code {}", out.exit_code)
                    } else {
                        format!("exit code {}: {}", out.exit_code, out.stderr.trim_end())
                    });
                }
                Err(e) => {
                    rec.status = ItemStatus::FailedTerminal;
                    rec.error = Some(e.to_string());
                }
            }
        }
    }

    if rec.status == ItemStatus::Succeeded {
        if let Some(spec) = &ctx.opts.module_spec {
            let mode = if ctx.opts.fanout {
                ChainMode::FanOut
            } else {
                ChainMode::Chained
            };
            let prototype = ModuleOptions::default()
                .with_proxy(ctx.opts.proxy.clone())
                .with_extra(ctx.opts.module_extra.clone());
            let resolver = ChainResolver::new(&ctx.registry);
            match resolver.resolve(spec, &module_input, mode, &prototype).await {
                Ok(stages) => {
                    // A chained fault kills the item; fan-out faults stay
                    // per-stage so siblings remain reportable.
                    if mode == ChainMode::Chained {
                        if let Some(fault) = stages.iter().find_map(|s| s.error.clone()) {
                            rec.status = ItemStatus::FailedTerminal;
                            rec.error = Some(fault);
                        }
                    }
                    rec.stages = stages;
                }
                Err(e) => {
                    rec.status = ItemStatus::FailedTerminal;
                    rec.error = Some(e.to_string());
                }
            }
        }
    }

    rec.duration_ms = started.elapsed().as_millis() as u64;
    rec
}

/// First attempt plus up to `max_attempts - 1` retries with strategy-chosen
/// delays. Returns the final outcome and the exact attempt count.
async fn execute_with_retry(
    ctx: &WorkerCtx,
    command: &str,
) -> (Result<crate::exec::ExecOutput, EngineError>, u32) {
    let run_once = || async {
        match &ctx.opts.pipe_command {
            Some(pipe) => ctx.executor.execute_piped(command, pipe).await,
            None => ctx.executor.execute(command).await,
        }
    };

    let max_attempts = ctx
        .retry
        .as_ref()
        .map(|s| s.max_attempts().max(1))
        .unwrap_or(1);

    let mut current = run_once().await;
    let mut attempts = 1u32;

    if let Some(strategy) = &ctx.retry {
        for attempt in 1..max_attempts {
            let err = match &current {
                Ok(out) if out.success() => break,
                Ok(out) => format!("exit code {}", out.exit_code),
                Err(e) => e.to_string(),
            };
            if !strategy.should_retry(attempt, &err) {
                break;
            }
            let Some(delay) = strategy.next_delay(attempt, &err) else {
                break;
            };
            tracing::debug!(
                "retrying '{}' (attempt {}/{}) after {:?}: {}",
                command,
                attempt + 1,
                max_attempts,
                delay,
                err
            );
            tokio::time::sleep(delay).await;
            current = run_once().await;
            attempts = attempt + 1;
        }
    }

    (current, attempts)
}
