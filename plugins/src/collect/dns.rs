use async_trait::async_trait;
use tokio::net::lookup_host;

use skein_core::module::{ModuleOptions, ModulePlugin};

/// Resolves a host name to its addresses via the system resolver.
pub struct DnsCollector;

#[async_trait]
impl ModulePlugin for DnsCollector {
    fn name(&self) -> &str {
        "dns"
    }

    fn category(&self) -> &str {
        "clc"
    }

    fn description(&self) -> &str {
        "resolve a host name to ip addresses"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let host = opts.data.trim();
        if host.is_empty() {
            return Ok(vec![]);
        }

        // lookup_host requires a port; it plays no part in the answer.
        let target = if host.contains(':') {
            host.to_string()
        } else {
            format!("{host}:80")
        };

        let mut addrs: Vec<String> = lookup_host(target)
            .await?
            .map(|sa| sa.ip().to_string())
            .collect();
        addrs.dedup();
        Ok(addrs)
    }
}
