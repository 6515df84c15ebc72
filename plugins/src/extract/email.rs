use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use skein_core::module::{ModuleOptions, ModulePlugin};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9][A-Za-z0-9.-]*\.[A-Za-z]{2,}").unwrap();
}

/// Pulls email addresses out of free text.
pub struct EmailExtractor;

#[async_trait]
impl ModulePlugin for EmailExtractor {
    fn name(&self) -> &str {
        "email"
    }

    fn category(&self) -> &str {
        "ext"
    }

    fn description(&self) -> &str {
        "extract email addresses from text"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let found = EMAIL_RE
            .find_iter(&opts.data)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        Ok(super::dedup(found))
    }
}
