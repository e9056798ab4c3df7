//! Clean command implementation.

use std::path::{Path, PathBuf};

use crate::cli::theme::LabflowTheme;
use crate::error::Result;
use crate::flags::FileFlagStore;
use crate::report::RunReport;
use crate::runner::{ManagerCommand, PipelineOrchestrator};
use crate::steps::StepRegistry;

use super::dispatcher::{load_project, Command, CommandResult, EXIT_LOAD_ERROR};

/// The clean command implementation.
pub struct CleanCommand {
    project_root: PathBuf,
}

impl CleanCommand {
    /// Create a new clean command.
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
        }
    }
}

impl Command for CleanCommand {
    fn execute(&self, theme: &LabflowTheme) -> Result<CommandResult> {
        let registry = StepRegistry::with_builtins();
        let (layout, pipelines) = match load_project(&self.project_root, &registry) {
            Ok(project) => project,
            Err(e) => {
                eprintln!("{} {}", theme.error.apply_to("Error:"), e);
                return Ok(CommandResult::failure(EXIT_LOAD_ERROR));
            }
        };

        // Cleaning clears flags but never writes a report.
        let mut flags = FileFlagStore::new(layout.flag_prefix());
        let mut report = RunReport::new();
        let mut orchestrator = PipelineOrchestrator::new(
            pipelines,
            &registry,
            &mut flags,
            &mut report,
            layout.report_dir(),
        );

        let outcome = orchestrator.run(ManagerCommand::Clean);

        if outcome.removed.is_empty() && outcome.is_ok() {
            println!("{}", theme.dim.apply_to("Nothing to clean."));
        }
        for path in &outcome.removed {
            println!("{} {}", theme.warning.apply_to("Removed"), path.display());
        }
        if let Some(err) = &outcome.error {
            eprintln!("{} {}", theme.error.apply_to("Error:"), err);
        }

        Ok(CommandResult::success())
    }
}
