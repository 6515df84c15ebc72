use std::net::Ipv4Addr;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use skein_core::module::{ModuleOptions, ModulePlugin};

lazy_static! {
    static ref IPV4_RE: Regex =
        Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap();
}

/// Pulls IPv4 addresses out of free text. Octet range checking is left to
/// the address parser rather than the regex.
pub struct IpExtractor;

#[async_trait]
impl ModulePlugin for IpExtractor {
    fn name(&self) -> &str {
        "ip"
    }

    fn category(&self) -> &str {
        "ext"
    }

    fn description(&self) -> &str {
        "extract ipv4 addresses from text"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let found = IPV4_RE
            .find_iter(&opts.data)
            .filter(|m| m.as_str().parse::<Ipv4Addr>().is_ok())
            .map(|m| m.as_str().to_string())
            .collect();
        Ok(super::dedup(found))
    }
}
