//! Step chain execution for a single pipeline.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::StepParameters;
use crate::error::{LabflowError, Result};
use crate::flags::FlagStore;
use crate::pipeline::{Pipeline, PipelineStatus, Step};
use crate::report::{ErrorFields, ReportSink, StepStatus};
use crate::steps::{ErrorRecord, StepOutcome, StepRegistry};

/// Owning pipeline name.
pub const PARAM_PIPELINE: &str = "pipeline";
/// Pipeline output location.
pub const PARAM_PIPELINE_PATH: &str = "pipeline_path";
/// Completion flag prefix of the pipeline.
pub const PARAM_PROCESS_PATH: &str = "process_path";
/// Qualified step name.
pub const PARAM_STEP_NAME: &str = "step_name";
/// Parameters of the previous invocation in the same pipeline.
pub const PARAM_PREVIOUS_PARAMETERS: &str = "previous_parameters";

/// Build the parameters for one invocation of `step`.
///
/// Run-context keys override the step's defaults. The previous snapshot
/// stored on the pipeline already has its own `previous_parameters`
/// erased, so nesting never goes deeper than one level.
pub fn invocation_parameters(pipeline: &Pipeline, step: &Step) -> StepParameters {
    let mut parameters = step.default_parameters.clone();
    parameters.insert(PARAM_PIPELINE.into(), Value::String(pipeline.name.clone()));
    parameters.insert(
        PARAM_PIPELINE_PATH.into(),
        Value::String(pipeline.output_path.display().to_string()),
    );
    parameters.insert(
        PARAM_PROCESS_PATH.into(),
        Value::String(pipeline.process_path.display().to_string()),
    );
    parameters.insert(
        PARAM_STEP_NAME.into(),
        Value::String(pipeline.step_name(&step.name)),
    );
    let previous = pipeline
        .previous_parameters()
        .cloned()
        .map(Value::Object)
        .unwrap_or(Value::Null);
    parameters.insert(PARAM_PREVIOUS_PARAMETERS.into(), previous);
    parameters
}

/// Copy of `parameters` that is safe to forward to the next step.
fn forwardable(parameters: &StepParameters) -> StepParameters {
    let mut snapshot = parameters.clone();
    snapshot.insert(PARAM_PREVIOUS_PARAMETERS.into(), Value::Null);
    snapshot
}

/// Runs a pipeline's step chain in order.
pub struct StepExecutor<'a> {
    registry: &'a StepRegistry,
    flags: &'a mut dyn FlagStore,
    report: &'a mut dyn ReportSink,
}

impl<'a> StepExecutor<'a> {
    /// Create an executor over the given registry, flag store and report.
    pub fn new(
        registry: &'a StepRegistry,
        flags: &'a mut dyn FlagStore,
        report: &'a mut dyn ReportSink,
    ) -> Self {
        Self {
            registry,
            flags,
            report,
        }
    }

    /// Run every step of `pipeline`.
    ///
    /// Stops at the first fatal outcome and returns
    /// [`LabflowError::PipelineFailed`]; the pipeline is then `Failed`.
    /// Otherwise the pipeline ends `Completed`.
    pub fn run_pipeline(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        pipeline.set_status(PipelineStatus::Running);

        for index in 0..pipeline.steps.len() {
            let step = pipeline.steps[index].clone();
            if let Err(reason) = self.run_step(pipeline, &step) {
                pipeline.set_status(PipelineStatus::Failed);
                return Err(LabflowError::PipelineFailed {
                    pipeline: pipeline.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        pipeline.set_status(PipelineStatus::Completed);
        Ok(())
    }

    fn run_step(&mut self, pipeline: &mut Pipeline, step: &Step) -> Result<()> {
        let step_name = pipeline.step_name(&step.name);
        info!("Executing step {}", step_name);
        self.report.record_step_start(&step_name);

        let parameters = invocation_parameters(pipeline, step);
        pipeline.set_previous_parameters(forwardable(&parameters));

        match self.flags.is_complete(&pipeline.name, &step.name) {
            Ok(true) => {
                info!("Step {} is already complete", step_name);
                self.report
                    .record_step_status(&step_name, StepStatus::AlreadyComplete);
                return Ok(());
            }
            Ok(false) => {}
            Err(err) => return Err(self.fault(&step_name, err)),
        }

        let outcome = self
            .registry
            .create(step)
            .and_then(|runner| runner.run(&parameters));

        match outcome {
            Ok(StepOutcome::Completed) => {
                if let Err(err) = self.flags.mark_complete(&pipeline.name, &step.name) {
                    return Err(self.fault(&step_name, err));
                }
                debug!("Step {} completed", step_name);
                self.report.record_step_status(&step_name, StepStatus::Completed);
                Ok(())
            }
            Ok(StepOutcome::Incomplete) => {
                let err = LabflowError::IncompleteStep {
                    step: step_name.clone(),
                };
                error!("{}", err);
                self.report
                    .record_unknown_error(&err.to_string(), &ErrorFields::new());
                self.report.record_step_status(&step_name, StepStatus::Failed);
                Err(err)
            }
            Ok(StepOutcome::Failed(record)) => self.classify(&step_name, record),
            Err(err) => Err(self.fault(&step_name, err)),
        }
    }

    /// Report a runner error and decide whether the chain goes on.
    fn classify(&mut self, step_name: &str, record: ErrorRecord) -> Result<()> {
        let fatal = record.is_fatal();
        let ErrorRecord {
            message,
            error_type,
            fields,
            ..
        } = record;

        match &error_type {
            Some(kind) => self.report.record_known_error(&message, kind, &fields),
            None => self.report.record_unknown_error(&message, &fields),
        }

        if fatal {
            error!("Step {} failed: {}", step_name, message);
            self.report.record_step_status(step_name, StepStatus::Failed);
            return Err(LabflowError::StepFailed {
                step: step_name.to_string(),
                message,
            });
        }

        warn!("Step {} reported a non-fatal error: {}", step_name, message);
        self.report.record_step_status(step_name, StepStatus::Warned);
        Ok(())
    }

    fn fault(&mut self, step_name: &str, err: LabflowError) -> LabflowError {
        error!("Step {} raised an internal error: {}", step_name, err);
        self.report
            .record_unknown_error(&err.to_string(), &ErrorFields::new());
        self.report.record_step_status(step_name, StepStatus::Failed);
        err
    }
}
