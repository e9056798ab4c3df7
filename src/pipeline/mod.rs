//! Pipeline and step models.
//!
//! A [`Pipeline`] is instantiated once per run from a
//! [`PipelineDefinition`]. Its status and its one-hop parameter snapshot
//! are mutated during that run only.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{PipelineDefinition, ProjectLayout, StepParameters};
use crate::error::{LabflowError, Result};
use crate::steps::StepRegistry;

/// Allowed pipeline and step names; both end up as path components.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("NAME_PATTERN must compile")
});

/// Execution state of a pipeline within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Not visited yet.
    #[default]
    Pending,
    /// Steps are being executed.
    Running,
    /// Every step completed.
    Completed,
    /// A step failed fatally, ended incomplete, or faulted.
    Failed,
    /// Not executed because the pipeline it depends on failed.
    Skipped,
}

impl PipelineStatus {
    /// Whether the pipeline counts as failed for dependents.
    pub fn is_failed(&self) -> bool {
        matches!(self, PipelineStatus::Failed | PipelineStatus::Skipped)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// One step of a pipeline chain.
#[derive(Debug, Clone)]
pub struct Step {
    /// Step name, unique within its pipeline.
    pub name: String,
    /// Step type identifier; selects the runner.
    pub kind: String,
    /// Parameters merged into every invocation.
    pub default_parameters: StepParameters,
}

/// A named, ordered chain of steps with optional ordering declarations.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Unique pipeline name.
    pub name: String,
    /// Pipeline type identifier.
    pub kind: String,
    /// Ordered steps.
    pub steps: Vec<Step>,
    /// Must run after this pipeline.
    pub after: Option<String>,
    /// Must run before this pipeline.
    pub before: Option<String>,
    /// Where this pipeline writes its output.
    pub output_path: PathBuf,
    /// Completion flag prefix for this pipeline's steps.
    pub process_path: PathBuf,
    status: PipelineStatus,
    previous_parameters: Option<StepParameters>,
}

impl Pipeline {
    /// Create an empty pipeline rooted at `output_path`.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        Self {
            name: name.into(),
            kind: kind.into(),
            steps: Vec::new(),
            after: None,
            before: None,
            process_path: output_path.clone(),
            output_path,
            status: PipelineStatus::Pending,
            previous_parameters: None,
        }
    }

    /// Instantiate a pipeline from its definition.
    ///
    /// Steps without an explicit type get the default step type of the
    /// pipeline type. Unknown types are rejected here, before any run.
    pub fn from_definition(
        definition: &PipelineDefinition,
        layout: &ProjectLayout,
        registry: &StepRegistry,
    ) -> Result<Self> {
        let name = definition
            .name
            .clone()
            .ok_or_else(|| LabflowError::ConfigValidationError {
                message: "Pipeline definition without a name".to_string(),
            })?;
        validate_name("pipeline", &name)?;

        let default_kind = registry.default_step_kind(&definition.kind).ok_or_else(|| {
            LabflowError::UnknownPipelineType {
                pipeline: name.clone(),
                kind: definition.kind.clone(),
            }
        })?;

        let mut seen = HashSet::new();
        let mut steps = Vec::with_capacity(definition.chain.len());
        for step_def in &definition.chain {
            let kind = step_def.kind.clone().unwrap_or_else(|| default_kind.to_string());
            let step_name = step_def.name.clone().unwrap_or_else(|| kind.clone());
            validate_name("step", &step_name)?;
            if !registry.contains_step(&kind) {
                return Err(LabflowError::UnknownStepType {
                    step: format!("{}-{}", name, step_name),
                    kind,
                });
            }
            if !seen.insert(step_name.clone()) {
                return Err(LabflowError::ConfigValidationError {
                    message: format!("Pipeline '{}' has duplicate step '{}'", name, step_name),
                });
            }
            steps.push(Step {
                name: step_name,
                kind,
                default_parameters: step_def.default_parameters.clone(),
            });
        }

        let mut pipeline = Pipeline::new(&name, &definition.kind, layout.pipeline_output(&name));
        pipeline.process_path = layout.flag_prefix().join(&name);
        pipeline.steps = steps;
        pipeline.after = definition.after.clone();
        pipeline.before = definition.before.clone();
        Ok(pipeline)
    }

    /// Append a step (builder style).
    pub fn with_step(mut self, name: &str, kind: &str, default_parameters: StepParameters) -> Self {
        self.steps.push(Step {
            name: name.to_string(),
            kind: kind.to_string(),
            default_parameters,
        });
        self
    }

    /// Declare that this pipeline runs after `other`.
    pub fn run_after(mut self, other: &str) -> Self {
        self.after = Some(other.to_string());
        self
    }

    /// Declare that this pipeline runs before `other`.
    pub fn run_before(mut self, other: &str) -> Self {
        self.before = Some(other.to_string());
        self
    }

    /// Qualified step name: `<pipeline>-<step>`.
    pub fn step_name(&self, step: &str) -> String {
        format!("{}-{}", self.name, step)
    }

    /// Current status.
    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Whether the pipeline failed or was skipped in this run.
    pub fn has_failed(&self) -> bool {
        self.status.is_failed()
    }

    /// Move to a new status. A failed pipeline stays failed for the run.
    pub fn set_status(&mut self, status: PipelineStatus) {
        if self.status.is_failed() {
            return;
        }
        self.status = status;
    }

    /// Whether this pipeline must wait for `previous`, judged from the two
    /// declarations alone.
    pub fn depends_on(&self, previous: &Pipeline) -> bool {
        previous.before.as_deref() == Some(self.name.as_str())
            || self.after.as_deref() == Some(previous.name.as_str())
    }

    /// Parameters of the previous step invocation, if any.
    pub fn previous_parameters(&self) -> Option<&StepParameters> {
        self.previous_parameters.as_ref()
    }

    pub(crate) fn set_previous_parameters(&mut self, parameters: StepParameters) {
        self.previous_parameters = Some(parameters);
    }

    /// Forget the state of a previous run.
    pub(crate) fn reset(&mut self) {
        self.status = PipelineStatus::Pending;
        self.previous_parameters = None;
    }

    /// Output location as a path reference.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

fn validate_name(what: &str, name: &str) -> Result<()> {
    if name == "." || name == ".." || !NAME_PATTERN.is_match(name) {
        return Err(LabflowError::ConfigValidationError {
            message: format!("Invalid {} name '{}'", what, name),
        });
    }
    Ok(())
}

/// Instantiate every definition, rejecting duplicate names.
///
/// The returned order is the discovery order of `definitions`.
pub fn instantiate(
    definitions: &[PipelineDefinition],
    layout: &ProjectLayout,
    registry: &StepRegistry,
) -> Result<Vec<Pipeline>> {
    let mut names = HashSet::new();
    let mut pipelines = Vec::with_capacity(definitions.len());
    for definition in definitions {
        let pipeline = Pipeline::from_definition(definition, layout, registry)?;
        if !names.insert(pipeline.name.clone()) {
            return Err(LabflowError::ConfigValidationError {
                message: format!("Duplicate pipeline name '{}'", pipeline.name),
            });
        }
        pipelines.push(pipeline);
    }
    Ok(pipelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProjectSettings, StepDefinition};

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/data/plate1", ProjectSettings::default())
    }

    fn definition(name: &str, chain: Vec<StepDefinition>) -> PipelineDefinition {
        PipelineDefinition {
            name: Some(name.to_string()),
            kind: "default".to_string(),
            chain,
            ..Default::default()
        }
    }

    #[test]
    fn from_definition_resolves_default_step_type() {
        let def = definition(
            "illum",
            vec![
                StepDefinition {
                    name: Some("correct".to_string()),
                    ..Default::default()
                },
                StepDefinition {
                    kind: Some("noop".to_string()),
                    ..Default::default()
                },
            ],
        );
        let pipeline = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins()).unwrap();

        assert_eq!(pipeline.steps[0].kind, "command");
        assert_eq!(pipeline.steps[1].name, "noop");
        assert_eq!(pipeline.output_path, PathBuf::from("/data/plate1/illum"));
        assert_eq!(pipeline.process_path, PathBuf::from("/data/plate1/illum"));
        assert_eq!(pipeline.status(), PipelineStatus::Pending);
    }

    #[test]
    fn from_definition_rejects_unknown_step_type() {
        let def = definition(
            "illum",
            vec![StepDefinition {
                kind: Some("matlab".to_string()),
                ..Default::default()
            }],
        );
        let result = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins());
        assert!(matches!(result, Err(LabflowError::UnknownStepType { .. })));
    }

    #[test]
    fn from_definition_rejects_unknown_pipeline_type() {
        let mut def = definition("illum", vec![]);
        def.kind = "CellProfiler".to_string();
        let result = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins());
        assert!(matches!(result, Err(LabflowError::UnknownPipelineType { .. })));
    }

    #[test]
    fn from_definition_rejects_duplicate_step_names() {
        let step = StepDefinition {
            kind: Some("noop".to_string()),
            ..Default::default()
        };
        let def = definition("illum", vec![step.clone(), step]);
        let result = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins());
        assert!(matches!(result, Err(LabflowError::ConfigValidationError { .. })));
    }

    #[test]
    fn from_definition_rejects_path_like_names() {
        let def = definition("../escape", vec![]);
        let result = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins());
        assert!(result.is_err());
    }

    #[test]
    fn from_definition_rejects_path_like_step_names() {
        for bad in ["../../x", "..", "a/b"] {
            let def = definition(
                "illum",
                vec![StepDefinition {
                    name: Some(bad.to_string()),
                    kind: Some("noop".to_string()),
                    ..Default::default()
                }],
            );
            let result = Pipeline::from_definition(&def, &layout(), &StepRegistry::with_builtins());
            match result {
                Err(LabflowError::ConfigValidationError { message }) => {
                    assert!(message.contains("step name"), "{}", message)
                }
                other => panic!("expected rejection of {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn instantiate_rejects_duplicate_pipelines() {
        let defs = vec![definition("illum", vec![]), definition("illum", vec![])];
        let result = instantiate(&defs, &layout(), &StepRegistry::with_builtins());
        assert!(matches!(result, Err(LabflowError::ConfigValidationError { .. })));
    }

    #[test]
    fn step_name_is_qualified() {
        let pipeline = Pipeline::new("illum", "default", "/tmp/illum");
        assert_eq!(pipeline.step_name("correct"), "illum-correct");
    }

    #[test]
    fn depends_on_checks_both_declarations() {
        let first = Pipeline::new("a", "default", "/tmp/a");
        let after_first = Pipeline::new("b", "default", "/tmp/b").run_after("a");
        let unrelated = Pipeline::new("c", "default", "/tmp/c");
        assert!(after_first.depends_on(&first));
        assert!(!unrelated.depends_on(&first));

        let before_c = Pipeline::new("a", "default", "/tmp/a").run_before("c");
        assert!(unrelated.depends_on(&before_c));
    }

    #[test]
    fn failed_status_is_sticky() {
        let mut pipeline = Pipeline::new("a", "default", "/tmp/a");
        pipeline.set_status(PipelineStatus::Running);
        pipeline.set_status(PipelineStatus::Failed);
        pipeline.set_status(PipelineStatus::Completed);
        assert_eq!(pipeline.status(), PipelineStatus::Failed);
        assert!(pipeline.has_failed());
    }

    #[test]
    fn reset_clears_run_state() {
        let mut pipeline = Pipeline::new("a", "default", "/tmp/a");
        pipeline.set_status(PipelineStatus::Failed);
        pipeline.set_previous_parameters(StepParameters::new());
        pipeline.reset();
        assert_eq!(pipeline.status(), PipelineStatus::Pending);
        assert!(pipeline.previous_parameters().is_none());
    }

    #[test]
    fn skipped_counts_as_failed() {
        assert!(PipelineStatus::Skipped.is_failed());
        assert!(!PipelineStatus::Completed.is_failed());
    }
}
