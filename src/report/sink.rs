//! The reporting contract consumed by the orchestrator and step executor.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::PipelineStatus;

/// Extra details attached to a reported error.
pub type ErrorFields = BTreeMap<String, String>;

/// Status of a step as shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Started, no result yet.
    Running,
    /// Runner reported completion.
    Completed,
    /// Flag store already had the step complete; runner not invoked.
    AlreadyComplete,
    /// Non-fatal error; the chain went on.
    Warned,
    /// Fatal error, incomplete, or fault.
    Failed,
}

impl StepStatus {
    /// Display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Running => '◉',
            StepStatus::Completed => '✓',
            StepStatus::AlreadyComplete => '✓',
            StepStatus::Warned => '!',
            StepStatus::Failed => '✗',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::AlreadyComplete => "already complete",
            StepStatus::Warned => "completed with warnings",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Receives run progress and errors; persists the result.
///
/// Passed explicitly to the orchestrator so runs and tests can use
/// isolated instances.
pub trait ReportSink {
    /// Begin a new run, discarding previous entries.
    fn start_run(&mut self);

    /// A pipeline begins executing.
    fn record_pipeline_start(&mut self, name: &str);

    /// A pipeline reached a status (creates the entry if it was never started).
    fn record_pipeline_status(&mut self, name: &str, status: PipelineStatus);

    /// A step of the current pipeline begins.
    fn record_step_start(&mut self, step_name: &str);

    /// A step of the current pipeline reached a status.
    fn record_step_status(&mut self, step_name: &str, status: StepStatus);

    /// An error with an `error_type` tag, attached to the current step.
    fn record_known_error(&mut self, message: &str, error_type: &str, fields: &ErrorFields);

    /// An error without a tag, attached to the current step.
    fn record_unknown_error(&mut self, message: &str, fields: &ErrorFields);

    /// Wall time of the command that produced this run.
    fn record_duration(&mut self, duration: Duration);

    /// Close the run.
    fn finalize_run(&mut self);

    /// Write the report into `dir`, returning the file written.
    fn persist(&self, dir: &Path) -> Result<PathBuf>;

    /// Write or refresh the status view in `dir`, returning the file written.
    fn render_status_view(&self, dir: &Path) -> Result<PathBuf>;
}
