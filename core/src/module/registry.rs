use std::collections::HashMap;

use crate::error::EngineError;

use super::spec::{ModuleSpec, StageRef};
use super::ModulePlugin;

pub type ModuleFactory = fn() -> Box<dyn ModulePlugin>;

/// Startup-time mapping of (category, name) to module constructors.
///
/// Registration happens once when the registry is built; lookups after that
/// are read-only, so the registry can be shared across workers without
/// synchronization.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: HashMap<(String, String), ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, category: &str, name: &str, factory: ModuleFactory) {
        self.factories
            .insert((category.to_string(), name.to_string()), factory);
    }

    pub fn contains(&self, stage: &StageRef) -> bool {
        self.factories
            .contains_key(&(stage.category.clone(), stage.name.clone()))
    }

    /// Instantiate a fresh module for one invocation.
    pub fn instantiate(&self, stage: &StageRef) -> Result<Box<dyn ModulePlugin>, EngineError> {
        let factory = self
            .factories
            .get(&(stage.category.clone(), stage.name.clone()))
            .ok_or_else(|| EngineError::Config(format!("unknown module: {stage}")))?;
        Ok(factory())
    }

    /// Eagerly check every stage of a spec. Called once at startup so an
    /// unknown module is a configuration error, never a per-item surprise.
    pub fn validate_spec(&self, spec: &ModuleSpec) -> Result<(), EngineError> {
        for stage in &spec.stages {
            if !self.contains(stage) {
                return Err(EngineError::Config(format!("unknown module: {stage}")));
            }
        }
        Ok(())
    }

    /// Registered (category, name) pairs, sorted for stable listings.
    pub fn catalog(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self.factories.keys().cloned().collect();
        entries.sort();
        entries
    }
}
