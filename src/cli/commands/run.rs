//! Run command implementation.
//!
//! The `labflow run` command executes every pipeline of the project in
//! dependency order and prints a per-pipeline summary.

use std::path::{Path, PathBuf};

use crate::cli::theme::LabflowTheme;
use crate::error::Result;
use crate::flags::FileFlagStore;
use crate::pipeline::PipelineStatus;
use crate::report::RunReport;
use crate::runner::{ManagerCommand, PipelineOrchestrator};
use crate::steps::StepRegistry;

use super::dispatcher::{load_project, Command, CommandResult, EXIT_LOAD_ERROR};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
        }
    }
}

fn status_glyph(status: PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::Completed => "✓",
        PipelineStatus::Failed => "✗",
        PipelineStatus::Skipped => "⊘",
        PipelineStatus::Pending | PipelineStatus::Running => "○",
    }
}

impl Command for RunCommand {
    fn execute(&self, theme: &LabflowTheme) -> Result<CommandResult> {
        let registry = StepRegistry::with_builtins();
        let (layout, pipelines) = match load_project(&self.project_root, &registry) {
            Ok(project) => project,
            Err(e) => {
                eprintln!("{} {}", theme.error.apply_to("Error:"), e);
                return Ok(CommandResult::failure(EXIT_LOAD_ERROR));
            }
        };

        if pipelines.is_empty() {
            println!("{}", theme.dim.apply_to("No pipelines found."));
        }

        let mut flags = FileFlagStore::new(layout.flag_prefix());
        let mut report = RunReport::new();
        let mut orchestrator = PipelineOrchestrator::new(
            pipelines,
            &registry,
            &mut flags,
            &mut report,
            layout.report_dir(),
        );

        let outcome = orchestrator.run(ManagerCommand::Run);

        if let Some(summary) = &outcome.summary {
            println!("{}", theme.header.apply_to("Pipelines"));
            for name in &summary.order {
                let Some(pipeline) = orchestrator.pipeline(name) else {
                    continue;
                };
                let status = pipeline.status();
                let style = theme.status(status);
                println!(
                    "  {} {} {}",
                    style.apply_to(status_glyph(status)),
                    name,
                    theme.dim.apply_to(format!("({})", status))
                );
            }
            println!();
            println!(
                "{} completed, {} failed, {} skipped in {}s",
                summary.completed.len(),
                summary.failed.len(),
                summary.skipped.len(),
                outcome.duration.as_secs()
            );
            if let Some(path) = &summary.report_path {
                println!("{}", theme.dim.apply_to(format!("Report: {}", path.display())));
            }
        }

        // Orchestration errors were already logged; they do not change the exit code.
        if let Some(err) = &outcome.error {
            eprintln!("{} {}", theme.error.apply_to("Error:"), err);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_project_exits_with_load_error() {
        let temp = TempDir::new().unwrap();
        let cmd = RunCommand::new(&temp.path().join("missing"));
        let result = cmd.execute(&LabflowTheme::plain()).unwrap();
        assert_eq!(result.exit_code, EXIT_LOAD_ERROR);
    }

    #[test]
    fn runs_noop_pipeline_and_writes_report() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.pipe.yml"), "chain:\n  - type: noop\n").unwrap();

        let result = RunCommand::new(temp.path())
            .execute(&LabflowTheme::plain())
            .unwrap();

        assert!(result.success);
        assert!(temp.path().join("a/.flags/noop.complete").exists());
        assert!(temp.path().join(".labflow/reports/status.txt").exists());
    }

    #[test]
    fn glyphs_differ_per_status() {
        assert_ne!(
            status_glyph(PipelineStatus::Completed),
            status_glyph(PipelineStatus::Failed)
        );
    }
}
