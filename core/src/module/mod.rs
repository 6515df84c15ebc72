//! Pluggable processing units and the chain resolver that drives them.
//!
//! A module is stateless: it is instantiated fresh for every invocation,
//! handed an options mapping, run once, and discarded. Categories identify
//! the collaborator registry to search (`ext`, `clc`, `cnc`, `out`).

mod chain;
mod registry;
mod spec;

pub use chain::{chain_result, ChainMode, ChainResolver, StageOutput};
pub use registry::{ModuleFactory, ModuleRegistry};
pub use spec::{ModuleSpec, StageRef};

use std::collections::HashMap;

use async_trait::async_trait;

/// Options mapping handed to every module invocation. Always carries the
/// current input value under `data` and an optional `proxy`.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    pub data: String,
    pub proxy: Option<String>,
    pub extra: HashMap<String, String>,
}

impl ModuleOptions {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            proxy: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_extra(mut self, extra: HashMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}

/// One stateless processing unit.
///
/// Implementations must not raise past their own boundary for ordinary
/// malformed input: return `Ok(vec![])` for "no data" and reserve `Err` for
/// genuine faults (the resolver degrades those to an empty contribution).
#[async_trait]
pub trait ModulePlugin: Send + Sync {
    fn name(&self) -> &str;
    fn category(&self) -> &str;
    fn description(&self) -> &str {
        ""
    }
    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>>;
}
