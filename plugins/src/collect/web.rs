use std::time::Duration;

use async_trait::async_trait;

use skein_core::module::{ModuleOptions, ModulePlugin};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Issues an HTTP GET against the input and reports `status url`.
/// Honors the per-run proxy carried in the options mapping.
pub struct WebCollector;

impl WebCollector {
    fn client(proxy: Option<&str>) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("skein/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl ModulePlugin for WebCollector {
    fn name(&self) -> &str {
        "web"
    }

    fn category(&self) -> &str {
        "clc"
    }

    fn description(&self) -> &str {
        "http get, reports status and url"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let raw = opts.data.trim();
        if raw.is_empty() {
            return Ok(vec![]);
        }
        let url = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let client = Self::client(opts.proxy.as_deref())?;
        let resp = client.get(&url).send().await?;
        Ok(vec![format!("{} {}", resp.status().as_u16(), url)])
    }
}
