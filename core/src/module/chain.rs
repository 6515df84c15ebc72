use crate::error::EngineError;

use super::registry::ModuleRegistry;
use super::spec::ModuleSpec;
use super::ModuleOptions;

/// Module execution style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    /// Stage i consumes stage i-1's output; an empty stage ends the chain.
    Chained,
    /// Every stage independently consumes the original input.
    FanOut,
}

/// One stage's labeled contribution to a chain or fan-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub index: usize,
    pub label: String,
    pub results: Vec<String>,
    /// Set when a module invocation errored. Fan-out keeps siblings running;
    /// a chained run ends at the erroring stage.
    pub error: Option<String>,
}

/// Drives a parsed module spec over one input value.
///
/// Modules are instantiated per invocation and never retained, so no module
/// state survives across work items or across stages.
pub struct ChainResolver<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> ChainResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    pub async fn resolve(
        &self,
        spec: &ModuleSpec,
        input: &str,
        mode: ChainMode,
        prototype: &ModuleOptions,
    ) -> Result<Vec<StageOutput>, EngineError> {
        match mode {
            ChainMode::Chained => self.resolve_chained(spec, input, prototype).await,
            ChainMode::FanOut => self.resolve_fanout(spec, input, prototype).await,
        }
    }

    async fn resolve_chained(
        &self,
        spec: &ModuleSpec,
        input: &str,
        prototype: &ModuleOptions,
    ) -> Result<Vec<StageOutput>, EngineError> {
        let total = spec.len();
        let mut stage_outputs = Vec::with_capacity(total);
        let mut current: Vec<String> = vec![input.to_string()];

        for (idx, stage) in spec.stages.iter().enumerate() {
            let label = format!("stage {}/{}: {}", idx + 1, total, stage);
            let mut results = Vec::new();
            let mut fault: Option<String> = None;

            for value in &current {
                let module = self.registry.instantiate(stage)?;
                let mut opts = prototype.clone();
                opts.data = value.clone();
                match module.run(&opts).await {
                    Ok(out) => results.extend(out),
                    Err(e) => {
                        // The fault contributes nothing downstream but is
                        // kept on the stage record, first one wins.
                        tracing::error!("module {} failed on '{}': {}", stage, value, e);
                        fault.get_or_insert_with(|| e.to_string());
                    }
                }
            }

            let empty = results.is_empty();
            current = results.clone();
            stage_outputs.push(StageOutput {
                index: idx,
                label,
                results,
                error: fault,
            });

            if empty {
                // No data: downstream stages are never invoked.
                tracing::debug!("chain ended early at {} (no results)", stage);
                break;
            }
        }

        Ok(stage_outputs)
    }

    async fn resolve_fanout(
        &self,
        spec: &ModuleSpec,
        input: &str,
        prototype: &ModuleOptions,
    ) -> Result<Vec<StageOutput>, EngineError> {
        let total = spec.len();
        let mut stage_outputs = Vec::with_capacity(total);

        for (idx, stage) in spec.stages.iter().enumerate() {
            let label = format!("stage {}/{}: {}", idx + 1, total, stage);
            let module = self.registry.instantiate(stage)?;
            let mut opts = prototype.clone();
            opts.data = input.to_string();

            let (results, error) = match module.run(&opts).await {
                Ok(out) => (out, None),
                Err(e) => {
                    tracing::error!("module {} failed on '{}': {}", stage, input, e);
                    (Vec::new(), Some(e.to_string()))
                }
            };

            stage_outputs.push(StageOutput {
                index: idx,
                label,
                results,
                error,
            });
        }

        Ok(stage_outputs)
    }
}

/// Final result of a resolved chain: the last stage's output, or empty when
/// the chain short-circuited.
pub fn chain_result(outputs: &[StageOutput]) -> Vec<String> {
    outputs
        .last()
        .map(|s| s.results.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::module::{ModulePlugin, ModuleRegistry};

    struct EmailStub;
    struct DomainStub;
    struct NothingStub;
    struct FailingStub;

    #[async_trait]
    impl ModulePlugin for EmailStub {
        fn name(&self) -> &str {
            "email"
        }
        fn category(&self) -> &str {
            "ext"
        }
        async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            Ok(opts
                .data
                .split_whitespace()
                .filter(|w| w.contains('@'))
                .map(|w| w.to_string())
                .collect())
        }
    }

    #[async_trait]
    impl ModulePlugin for DomainStub {
        fn name(&self) -> &str {
            "domain"
        }
        fn category(&self) -> &str {
            "ext"
        }
        async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            Ok(opts
                .data
                .rsplit_once('@')
                .map(|(_, d)| vec![d.to_string()])
                .unwrap_or_default())
        }
    }

    #[async_trait]
    impl ModulePlugin for NothingStub {
        fn name(&self) -> &str {
            "nothing"
        }
        fn category(&self) -> &str {
            "clc"
        }
        async fn run(&self, _opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl ModulePlugin for FailingStub {
        fn name(&self) -> &str {
            "boom"
        }
        fn category(&self) -> &str {
            "clc"
        }
        async fn run(&self, _opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("synthetic failure")
        }
    }

    static TAIL_INVOCATIONS: AtomicUsize = AtomicUsize::new(0);

    struct CountingStub;
    struct TailStub;

    #[async_trait]
    impl ModulePlugin for CountingStub {
        fn name(&self) -> &str {
            "count"
        }
        fn category(&self) -> &str {
            "clc"
        }
        async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            Ok(vec![opts.data.clone()])
        }
    }

    #[async_trait]
    impl ModulePlugin for TailStub {
        fn name(&self) -> &str {
            "tail"
        }
        fn category(&self) -> &str {
            "clc"
        }
        async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
            TAIL_INVOCATIONS.fetch_add(1, Ordering::SeqCst);
            Ok(vec![opts.data.clone()])
        }
    }

    fn registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new();
        reg.register("ext", "email", || Box::new(EmailStub));
        reg.register("ext", "domain", || Box::new(DomainStub));
        reg.register("clc", "nothing", || Box::new(NothingStub));
        reg.register("clc", "boom", || Box::new(FailingStub));
        reg.register("clc", "count", || Box::new(CountingStub));
        reg.register("clc", "tail", || Box::new(TailStub));
        reg
    }

    #[tokio::test]
    async fn chained_feeds_stage_output_forward() {
        let reg = registry();
        let resolver = ChainResolver::new(&reg);
        let spec: ModuleSpec = "ext:email|ext:domain".parse().unwrap();
        let out = resolver
            .resolve(
                &spec,
                "reach contact@test.org today",
                ChainMode::Chained,
                &ModuleOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].results, vec!["contact@test.org"]);
        assert_eq!(out[1].results, vec!["test.org"]);
        assert_eq!(chain_result(&out), vec!["test.org"]);
    }

    #[tokio::test]
    async fn chain_short_circuits_on_empty_stage() {
        let reg = registry();
        let resolver = ChainResolver::new(&reg);
        let spec: ModuleSpec = "ext:email|clc:tail".parse().unwrap();
        let out = resolver
            .resolve(
                &spec,
                "no addresses here",
                ChainMode::Chained,
                &ModuleOptions::default(),
            )
            .await
            .unwrap();

        // Stage 2 never ran.
        assert_eq!(out.len(), 1);
        assert!(out[0].results.is_empty());
        assert_eq!(TAIL_INVOCATIONS.load(Ordering::SeqCst), 0);
        assert!(chain_result(&out).is_empty());
    }

    #[tokio::test]
    async fn chained_error_lands_on_the_stage_record() {
        let reg = registry();
        let resolver = ChainResolver::new(&reg);
        let spec: ModuleSpec = "clc:boom|clc:count".parse().unwrap();
        let out = resolver
            .resolve(&spec, "x", ChainMode::Chained, &ModuleOptions::default())
            .await
            .unwrap();
        // The fault ends the chain and stays visible on the stage.
        assert_eq!(out.len(), 1);
        assert!(out[0].results.is_empty());
        assert!(out[0].error.as_deref().unwrap().contains("synthetic failure"));
    }

    #[tokio::test]
    async fn fanout_gives_every_stage_the_original_input() {
        let reg = registry();
        let resolver = ChainResolver::new(&reg);
        let spec: ModuleSpec = "ext:email|clc:boom|clc:count".parse().unwrap();
        let input = "ping contact@test.org";
        let out = resolver
            .resolve(&spec, input, ChainMode::FanOut, &ModuleOptions::default())
            .await
            .unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].results, vec!["contact@test.org"]);
        // The failing sibling is a distinct errored entry...
        assert!(out[1].results.is_empty());
        assert!(out[1].error.as_deref().unwrap().contains("synthetic"));
        // ...and does not stop the next stage from seeing the original input.
        assert_eq!(out[2].results, vec![input.to_string()]);
        assert_eq!(out[2].label, "stage 3/3: clc:count");
    }

    #[tokio::test]
    async fn unknown_stage_is_a_config_error() {
        let reg = registry();
        let resolver = ChainResolver::new(&reg);
        let spec: ModuleSpec = "ext:missing".parse().unwrap();
        let err = resolver
            .resolve(&spec, "x", ChainMode::Chained, &ModuleOptions::default())
            .await;
        assert!(matches!(err, Err(EngineError::Config(_))));
    }
}
