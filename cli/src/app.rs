use std::collections::HashMap;
use std::sync::Arc;

use skein_core::config::AppConfig;
use skein_core::engine::{Engine, EngineOpts};
use skein_core::error::CliError;
use skein_core::input::InputSource;
use skein_core::module::ModuleSpec;
use skein_core::scheduler::CancelToken;
use skein_core::sink::{FilterPredicate, ResultSink};
use skein_plugins::factory;

use crate::commands::cli::Args;

pub async fn run(args: Args, mut cfg: AppConfig) -> Result<i32, CliError> {
    let registry = Arc::new(factory::builtin_registry());

    if args.list_modules {
        for (category, name) in registry.catalog() {
            println!("{category}:{name}");
        }
        return Ok(0);
    }

    apply_overrides(&args, &mut cfg);

    let module_spec = args
        .module
        .as_deref()
        .map(str::parse::<ModuleSpec>)
        .transpose()?;

    let piped = !atty::is(atty::Stream::Stdin);
    let source = InputSource::detect(args.input.clone(), args.string.clone(), piped)?;
    let items = source.materialize().await?;

    let retry = factory::build_retry(&cfg.retry);
    let verbose = args.verbose > 0;
    let renderer = factory::build_renderer(&cfg.output.format, verbose);

    let destination = match &args.output {
        None => None,
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(ResultSink::default_destination(renderer.file_extension())),
    };
    if let Some(path) = &destination {
        tracing::info!("writing results to {}", path.display());
    }

    // Progress only for interactive text runs; structured formats and quiet
    // mode must keep stderr clean.
    let progress =
        !args.quiet && cfg.output.format == "text" && atty::is(atty::Stream::Stderr);

    let sink = ResultSink::new(
        renderer,
        destination.as_deref(),
        FilterPredicate::new(args.filter.clone()),
        cfg.output.ordered_window,
    )?;

    let opts = EngineOpts {
        template: args.command.clone(),
        module_spec,
        fanout: args.fanout,
        direct: args.direct,
        pipe_command: args.pipe.clone(),
        filter: args.filter.clone(),
        proxy: args.proxy.clone(),
        module_extra: parse_module_opts(&args.opt)?,
        progress,
    };

    let engine = Engine::new(cfg, opts, registry, retry, sink, CancelToken::new())?;

    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, draining in-flight work");
            cancel.cancel();
        }
    });

    engine.run(items).await?;
    Ok(0)
}

fn apply_overrides(args: &Args, cfg: &mut AppConfig) {
    if let Some(token) = &args.placeholder {
        cfg.placeholder = token.clone();
    }
    if let Some(workers) = args.workers {
        cfg.scheduler.workers = workers.max(1);
    }
    if let Some(delay) = args.delay_ms {
        cfg.scheduler.dispatch_delay_ms = delay;
    }
    if let Some(timeout) = args.timeout {
        cfg.scheduler.timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        cfg.retry.max_attempts = retries + 1;
    }
    if let Some(delay) = args.retry_delay_ms {
        cfg.retry.base_delay_ms = delay;
    }
    if let Some(format) = &args.format {
        cfg.output.format = format.clone();
    }
    if let Some(window) = args.ordered {
        cfg.output.ordered_window = window;
    }
    if args.allow_dangerous {
        cfg.gate.allow_dangerous = true;
    }
    if args.no_limits {
        cfg.gate.skip_size_checks = true;
    }
}

fn parse_module_opts(pairs: &[String]) -> Result<HashMap<String, String>, CliError> {
    let mut extra = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "invalid --opt '{pair}', expected KEY=VALUE"
            )));
        };
        extra.insert(key.trim().to_string(), value.to_string());
    }
    Ok(extra)
}
