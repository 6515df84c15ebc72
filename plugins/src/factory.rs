use std::sync::Arc;

use skein_core::config::RetryConfig;
use skein_core::module::ModuleRegistry;
use skein_core::scheduler::RetryStrategyPlugin;
use skein_core::sink::RecordRenderer;

use crate::collect::{DnsCollector, WebCollector};
use crate::connect::TcpConnector;
use crate::extract::{DomainExtractor, EmailExtractor, IpExtractor, UrlExtractor};
use crate::output::{CsvFormatter, JsonFormatter};
use crate::renderers::{JsonRenderer, TableRenderer, TextRenderer};
use crate::strategies::{ExponentialBackoffPlugin, LinearRetryPlugin};

/// Registry with every built-in module registered under its category.
pub fn builtin_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();

    registry.register("ext", "email", || Box::new(EmailExtractor));
    registry.register("ext", "domain", || Box::new(DomainExtractor));
    registry.register("ext", "url", || Box::new(UrlExtractor));
    registry.register("ext", "ip", || Box::new(IpExtractor));

    registry.register("clc", "dns", || Box::new(DnsCollector));
    registry.register("clc", "web", || Box::new(WebCollector));

    registry.register("cnc", "tcp", || Box::new(TcpConnector));

    registry.register("out", "json", || Box::new(JsonFormatter));
    registry.register("out", "csv", || Box::new(CsvFormatter));

    registry
}

/// None when the configured budget is a single attempt.
pub fn build_retry(cfg: &RetryConfig) -> Option<Arc<dyn RetryStrategyPlugin>> {
    if cfg.max_attempts <= 1 {
        return None;
    }
    match cfg.strategy.as_str() {
        "exponential-backoff" => Some(Arc::new(ExponentialBackoffPlugin::new(cfg.clone()))),
        // Anything other than exponential-backoff behaves like linear.
        _ => Some(Arc::new(LinearRetryPlugin::new(cfg.clone()))),
    }
}

pub fn build_renderer(format: &str, verbose: bool) -> Box<dyn RecordRenderer> {
    match format {
        "json" => Box::new(JsonRenderer),
        "table" => Box::new(TableRenderer),
        // Anything other than json/table behaves like text.
        _ => Box::new(TextRenderer::new(verbose)),
    }
}
