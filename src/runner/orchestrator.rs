//! Run-level orchestration across pipelines.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::error::{LabflowError, Result};
use crate::flags::FlagStore;
use crate::pipeline::{Pipeline, PipelineStatus};
use crate::report::ReportSink;
use crate::steps::StepRegistry;

use super::dependency::DependencyGraph;
use super::executor::StepExecutor;

/// Commands accepted by [`PipelineOrchestrator::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerCommand {
    /// Execute every pipeline.
    Run,
    /// Remove every pipeline's output.
    Clean,
}

impl fmt::Display for ManagerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerCommand::Run => write!(f, "run"),
            ManagerCommand::Clean => write!(f, "clean"),
        }
    }
}

/// Per-pipeline results of [`PipelineOrchestrator::run_all`].
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Resolved execution order.
    pub order: Vec<String>,
    /// Pipelines whose chain completed.
    pub completed: Vec<String>,
    /// Pipelines that failed while executing.
    pub failed: Vec<String>,
    /// Pipelines skipped because their predecessor failed.
    pub skipped: Vec<String>,
    /// Persisted report file.
    pub report_path: Option<PathBuf>,
}

impl RunSummary {
    /// Whether no pipeline failed or was skipped.
    pub fn success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// What [`PipelineOrchestrator::run`] did.
#[derive(Debug)]
pub struct CommandOutcome {
    pub command: ManagerCommand,
    pub duration: Duration,
    /// Set by a `run` that got through the whole order.
    pub summary: Option<RunSummary>,
    /// Output directories removed by `clean`.
    pub removed: Vec<PathBuf>,
    /// Error that escaped the command, already logged.
    pub error: Option<LabflowError>,
}

impl CommandOutcome {
    /// Whether the command finished without an escaping error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns one run's pipelines and drives them in dependency order.
pub struct PipelineOrchestrator<'a> {
    pipelines: Vec<Pipeline>,
    registry: &'a StepRegistry,
    flags: &'a mut dyn FlagStore,
    report: &'a mut dyn ReportSink,
    report_dir: PathBuf,
}

impl<'a> PipelineOrchestrator<'a> {
    /// Create an orchestrator. `pipelines` must be in discovery order.
    pub fn new(
        pipelines: Vec<Pipeline>,
        registry: &'a StepRegistry,
        flags: &'a mut dyn FlagStore,
        report: &'a mut dyn ReportSink,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipelines,
            registry,
            flags,
            report,
            report_dir: report_dir.into(),
        }
    }

    /// Pipelines in discovery order, with their current status.
    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// Pipeline by name.
    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// Resolve the execution order without running anything.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        DependencyGraph::build(&self.pipelines).execution_order()
    }

    /// Execute every pipeline in dependency order.
    ///
    /// A cycle aborts before anything is recorded or executed. A pipeline
    /// that fails is contained: the walk goes on, and the next pipeline is
    /// skipped only if it depends directly on the failed one.
    pub fn run_all(&mut self) -> Result<RunSummary> {
        let order = self.execution_order()?;
        info!("Execution order: {}", order.join(", "));

        self.report.start_run();
        for pipeline in &mut self.pipelines {
            pipeline.reset();
        }
        let mut summary = RunSummary {
            order: order.clone(),
            ..RunSummary::default()
        };

        let mut previous: Option<usize> = None;
        for name in &order {
            let Some(current) = self.pipelines.iter().position(|p| &p.name == name) else {
                continue;
            };

            let blocked_by = previous.and_then(|prev| {
                let prev = &self.pipelines[prev];
                (self.pipelines[current].depends_on(prev) && prev.has_failed())
                    .then(|| prev.name.clone())
            });

            if let Some(blocker) = blocked_by {
                warn!(
                    "Skipping pipeline {} because {} has failed",
                    name, blocker
                );
                self.pipelines[current].set_status(PipelineStatus::Skipped);
                self.report
                    .record_pipeline_status(name, PipelineStatus::Skipped);
                summary.skipped.push(name.clone());
            } else {
                info!("Running pipeline {}", name);
                self.report.record_pipeline_start(name);

                let pipeline = &mut self.pipelines[current];
                let result = StepExecutor::new(self.registry, &mut *self.flags, &mut *self.report)
                    .run_pipeline(pipeline);

                match result {
                    Ok(()) => summary.completed.push(name.clone()),
                    Err(err) => {
                        error!("{}", err);
                        pipeline.set_status(PipelineStatus::Failed);
                        summary.failed.push(name.clone());
                    }
                }
                let status = pipeline.status();
                self.report.record_pipeline_status(name, status);
            }

            previous = Some(current);
        }

        self.report.finalize_run();
        summary.report_path = Some(self.save_report()?);
        Ok(summary)
    }

    /// Remove the output location of every pipeline that has one and
    /// forget its completed steps.
    pub fn clean_outputs(&mut self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for pipeline in &self.pipelines {
            self.flags.clear_pipeline(&pipeline.name)?;
            let path = pipeline.output_path();
            if !path.exists() {
                continue;
            }
            warn!("Removing output of pipeline {}: {}", pipeline.name, path.display());
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            removed.push(path.to_path_buf());
        }
        Ok(removed)
    }

    /// Run a command, timing it and containing any error it raises.
    pub fn run(&mut self, command: ManagerCommand) -> CommandOutcome {
        let start = Instant::now();
        let mut outcome = CommandOutcome {
            command,
            duration: Duration::ZERO,
            summary: None,
            removed: Vec::new(),
            error: None,
        };

        let result = match command {
            ManagerCommand::Run => self.run_all().map(|summary| outcome.summary = Some(summary)),
            ManagerCommand::Clean => self.clean_outputs().map(|removed| outcome.removed = removed),
        };

        outcome.duration = start.elapsed();
        info!(
            "Finished running {}. It took about {} (s)",
            command,
            outcome.duration.as_secs()
        );
        self.report.record_duration(outcome.duration);

        // Saved again so the stored duration matches the one logged.
        let result = result.and_then(|()| match command {
            ManagerCommand::Run => self.save_report().map(|_| ()),
            ManagerCommand::Clean => Ok(()),
        });

        if let Err(err) = result {
            error!("{} failed: {}", command, error_chain(&err));
            outcome.error = Some(err);
        }
        outcome
    }

    fn save_report(&self) -> Result<PathBuf> {
        let path = self.report.persist(&self.report_dir)?;
        self.report.render_status_view(&self.report_dir)?;
        Ok(path)
    }
}

fn error_chain(err: &LabflowError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
