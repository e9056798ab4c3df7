//! Order command implementation.
//!
//! The `labflow order` command prints the execution order without running
//! anything. Contradictory declarations exit with code 1.

use std::path::{Path, PathBuf};

use crate::cli::theme::LabflowTheme;
use crate::error::Result;
use crate::runner::DependencyGraph;
use crate::steps::StepRegistry;

use super::dispatcher::{load_project, Command, CommandResult, EXIT_LOAD_ERROR};

/// The order command implementation.
pub struct OrderCommand {
    project_root: PathBuf,
}

impl OrderCommand {
    /// Create a new order command.
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
        }
    }
}

impl Command for OrderCommand {
    fn execute(&self, theme: &LabflowTheme) -> Result<CommandResult> {
        let registry = StepRegistry::with_builtins();
        let (_, pipelines) = match load_project(&self.project_root, &registry) {
            Ok(project) => project,
            Err(e) => {
                eprintln!("{} {}", theme.error.apply_to("Error:"), e);
                return Ok(CommandResult::failure(EXIT_LOAD_ERROR));
            }
        };

        let graph = DependencyGraph::build(&pipelines);
        match graph.execution_order() {
            Ok(order) => {
                for (index, name) in order.iter().enumerate() {
                    println!("{} {}", theme.dim.apply_to(format!("{:>3}.", index + 1)), name);
                }
                Ok(CommandResult::success())
            }
            Err(e) => {
                eprintln!("{} {}", theme.error.apply_to("Error:"), e);
                Ok(CommandResult::failure(1))
            }
        }
    }
}
