//! JSON run report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::PipelineStatus;

use super::sink::{ErrorFields, ReportSink, StepStatus};
use super::status_view;

/// Record of one orchestration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: Option<DateTime<Utc>>,

    /// When the run was finalized.
    pub finished_at: Option<DateTime<Utc>>,

    /// Duration of the command, when recorded.
    pub duration_in_seconds: Option<f64>,

    /// Pipelines in the order they were visited.
    pub pipelines: Vec<PipelineReport>,
}

/// Report entry for a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub name: String,
    pub status: PipelineStatus,
    /// False for pipelines skipped by a cascade.
    pub started: bool,
    pub steps: Vec<StepReport>,
}

/// Report entry for a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportedError>,
}

/// An error attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "ErrorFields::is_empty")]
    pub fields: ErrorFields,
}

impl ReportedError {
    /// Whether the error carried a type tag.
    pub fn is_known(&self) -> bool {
        self.error_type.is_some()
    }
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline entry by name.
    pub fn pipeline(&self, name: &str) -> Option<&PipelineReport> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// Number of pipelines that were started.
    pub fn pipeline_starts(&self) -> usize {
        self.pipelines.iter().filter(|p| p.started).count()
    }

    /// Number of step entries across all pipelines.
    pub fn step_starts(&self) -> usize {
        self.pipelines.iter().map(|p| p.steps.len()).sum()
    }

    /// All errors across all steps.
    pub fn errors(&self) -> impl Iterator<Item = &ReportedError> {
        self.pipelines
            .iter()
            .flat_map(|p| p.steps.iter())
            .flat_map(|s| s.errors.iter())
    }

    /// File name used by [`ReportSink::persist`].
    pub fn file_name(&self) -> String {
        let stamp = self.started_at.unwrap_or_else(Utc::now);
        format!("report_{}.json", stamp.format("%Y%m%dT%H%M%S"))
    }

    /// Load a persisted report.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn pipeline_entry(&mut self, name: &str) -> &mut PipelineReport {
        let index = match self.pipelines.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.pipelines.push(PipelineReport {
                    name: name.to_string(),
                    status: PipelineStatus::Pending,
                    started: false,
                    steps: Vec::new(),
                });
                self.pipelines.len() - 1
            }
        };
        &mut self.pipelines[index]
    }

    fn current_step(&mut self) -> Option<&mut StepReport> {
        self.pipelines.last_mut().and_then(|p| p.steps.last_mut())
    }

    fn push_error(&mut self, error: ReportedError) {
        match self.current_step() {
            Some(step) => step.errors.push(error),
            None => warn!("Dropping error outside of any step: {}", error.message),
        }
    }
}

impl ReportSink for RunReport {
    fn start_run(&mut self) {
        *self = Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        };
    }

    fn record_pipeline_start(&mut self, name: &str) {
        let entry = self.pipeline_entry(name);
        entry.started = true;
        entry.status = PipelineStatus::Running;
    }

    fn record_pipeline_status(&mut self, name: &str, status: PipelineStatus) {
        self.pipeline_entry(name).status = status;
    }

    fn record_step_start(&mut self, step_name: &str) {
        match self.pipelines.last_mut() {
            Some(pipeline) => pipeline.steps.push(StepReport {
                name: step_name.to_string(),
                status: StepStatus::Running,
                errors: Vec::new(),
            }),
            None => warn!("Step {} started outside of any pipeline", step_name),
        }
    }

    fn record_step_status(&mut self, step_name: &str, status: StepStatus) {
        let step = self
            .pipelines
            .last_mut()
            .and_then(|p| p.steps.iter_mut().rev().find(|s| s.name == step_name));
        if let Some(step) = step {
            step.status = status;
        }
    }

    fn record_known_error(&mut self, message: &str, error_type: &str, fields: &ErrorFields) {
        self.push_error(ReportedError {
            message: message.to_string(),
            error_type: Some(error_type.to_string()),
            fields: fields.clone(),
        });
    }

    fn record_unknown_error(&mut self, message: &str, fields: &ErrorFields) {
        self.push_error(ReportedError {
            message: message.to_string(),
            error_type: None,
            fields: fields.clone(),
        });
    }

    fn record_duration(&mut self, duration: Duration) {
        self.duration_in_seconds = Some(duration.as_secs_f64());
    }

    fn finalize_run(&mut self) {
        let now = Utc::now();
        self.finished_at = Some(now);
        if self.duration_in_seconds.is_none() {
            if let Some(started) = self.started_at {
                let elapsed = (now - started).num_milliseconds().max(0);
                self.duration_in_seconds = Some(elapsed as f64 / 1000.0);
            }
        }
    }

    fn persist(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let content = serde_json::to_string_pretty(self)?;

        // Write to a temp file and rename so a crash never leaves half a report.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Report saved to {}", path.display());
        Ok(path)
    }

    fn render_status_view(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(status_view::STATUS_FILE);
        fs::write(&path, status_view::render(self))?;
        Ok(path)
    }
}
