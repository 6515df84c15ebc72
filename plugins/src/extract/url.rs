use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use skein_core::module::{ModuleOptions, ModulePlugin};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r#"https?://[^\s"'<>]+"#).unwrap();
}

/// Pulls http(s) URLs out of free text.
pub struct UrlExtractor;

#[async_trait]
impl ModulePlugin for UrlExtractor {
    fn name(&self) -> &str {
        "url"
    }

    fn category(&self) -> &str {
        "ext"
    }

    fn description(&self) -> &str {
        "extract http(s) urls from text"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let found = URL_RE
            .find_iter(&opts.data)
            .map(|m| {
                m.as_str()
                    .trim_end_matches(|c| matches!(c, '.' | ',' | ')'))
                    .to_string()
            })
            .collect();
        Ok(super::dedup(found))
    }
}
