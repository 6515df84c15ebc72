use async_trait::async_trait;

use skein_core::module::{ModuleOptions, ModulePlugin};

/// Wraps each input value in a one-line JSON record.
pub struct JsonFormatter;

#[async_trait]
impl ModulePlugin for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn category(&self) -> &str {
        "out"
    }

    fn description(&self) -> &str {
        "wrap each value in a json record"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let record = serde_json::json!({ "value": opts.data });
        Ok(vec![record.to_string()])
    }
}
