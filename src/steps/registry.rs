//! Explicit registry of step types and pipeline types.
//!
//! Step type identifiers map to runner constructors; pipeline type
//! identifiers map to the step type used when a chain entry has none.
//! Everything is registered at startup.

use std::collections::HashMap;

use crate::error::{LabflowError, Result};
use crate::pipeline::Step;

use super::builtin::{CommandRunner, NoopRunner};
use super::runner::StepRunner;

/// Builds a runner for a step.
pub type RunnerConstructor = Box<dyn Fn(&Step) -> Result<Box<dyn StepRunner>>>;

/// Registry of step runners and pipeline kinds.
#[derive(Default)]
pub struct StepRegistry {
    constructors: HashMap<String, RunnerConstructor>,
    pipeline_kinds: HashMap<String, String>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in step and pipeline types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_step(NoopRunner::KIND, |_| Ok(Box::new(NoopRunner)));
        registry.register_step(CommandRunner::KIND, |_| Ok(Box::new(CommandRunner)));
        registry.register_pipeline_kind("default", CommandRunner::KIND);
        registry
    }

    /// Register (or replace) a step type.
    pub fn register_step<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&Step) -> Result<Box<dyn StepRunner>> + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    /// Register (or replace) a pipeline type and its default step type.
    pub fn register_pipeline_kind(&mut self, kind: impl Into<String>, default_step: impl Into<String>) {
        self.pipeline_kinds.insert(kind.into(), default_step.into());
    }

    /// Whether a step type is registered.
    pub fn contains_step(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Default step type for a pipeline type.
    pub fn default_step_kind(&self, pipeline_kind: &str) -> Option<&str> {
        self.pipeline_kinds.get(pipeline_kind).map(String::as_str)
    }

    /// Registered step types, sorted.
    pub fn step_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build the runner for a step.
    pub fn create(&self, step: &Step) -> Result<Box<dyn StepRunner>> {
        let constructor =
            self.constructors
                .get(&step.kind)
                .ok_or_else(|| LabflowError::UnknownStepType {
                    step: step.name.clone(),
                    kind: step.kind.clone(),
                })?;
        constructor(step)
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.step_kinds())
            .field("pipeline_kinds", &self.pipeline_kinds)
            .finish()
    }
}
