use async_trait::async_trait;

use skein_core::module::{ModuleOptions, ModulePlugin};

/// Emits each input value as a single CSV field line, quoted only when the
/// value needs it.
pub struct CsvFormatter;

fn csv_field(value: &str) -> String {
    if value.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[async_trait]
impl ModulePlugin for CsvFormatter {
    fn name(&self) -> &str {
        "csv"
    }

    fn category(&self) -> &str {
        "out"
    }

    fn description(&self) -> &str {
        "emit each value as a csv field line"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        Ok(vec![csv_field(&opts.data)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(csv_field("a.com"), "a.com");
    }

    #[test]
    fn commas_force_quoting() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(csv_field(r#"he said "hi""#), r#""he said ""hi""""#);
    }
}
