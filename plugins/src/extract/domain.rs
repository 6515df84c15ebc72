use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use skein_core::module::{ModuleOptions, ModulePlugin};

lazy_static! {
    static ref HOST_RE: Regex = Regex::new(
        r"(?i)\b(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b"
    )
    .unwrap();
}

/// Pulls host names out of free text, including the domain part of email
/// addresses and URLs.
pub struct DomainExtractor;

#[async_trait]
impl ModulePlugin for DomainExtractor {
    fn name(&self) -> &str {
        "domain"
    }

    fn category(&self) -> &str {
        "ext"
    }

    fn description(&self) -> &str {
        "extract host names from text, emails and urls"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let found = HOST_RE
            .find_iter(&opts.data)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        Ok(super::dedup(found))
    }
}
