//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::cli::theme::LabflowTheme;
use crate::config::{load_definitions, ProjectLayout};
use crate::error::Result;
use crate::pipeline::{instantiate, Pipeline};
use crate::steps::StepRegistry;

/// Exit code when the project cannot be loaded.
pub const EXIT_LOAD_ERROR: i32 = 2;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing styled output with `theme`.
    fn execute(&self, theme: &LabflowTheme) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Load settings and definitions under `root` and instantiate the pipelines.
pub fn load_project(root: &Path, registry: &StepRegistry) -> Result<(ProjectLayout, Vec<Pipeline>)> {
    let layout = ProjectLayout::load(root)?;
    let definitions = load_definitions(&layout)?;
    let pipelines = instantiate(&definitions, &layout, registry)?;
    tracing::debug!(
        "Loaded {} pipeline(s) from {}",
        pipelines.len(),
        layout.root().display()
    );
    Ok((layout, pipelines))
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, theme: &LabflowTheme) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run => super::run::RunCommand::new(&self.project_root).execute(theme),
            Commands::Clean => super::clean::CleanCommand::new(&self.project_root).execute(theme),
            Commands::Order => super::order::OrderCommand::new(&self.project_root).execute(theme),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(theme)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn load_project_instantiates_definitions() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("b.pipe.yml"),
            "after: a\nchain:\n  - type: noop\n",
        )
        .unwrap();
        fs::write(temp.path().join("a.pipe.yml"), "chain: []\n").unwrap();

        let (layout, pipelines) =
            load_project(temp.path(), &StepRegistry::with_builtins()).unwrap();

        assert_eq!(layout.root(), temp.path());
        let names: Vec<_> = pipelines.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(pipelines[1].after.as_deref(), Some("a"));
    }

    #[test]
    fn load_project_fails_on_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = load_project(&temp.path().join("missing"), &StepRegistry::with_builtins());
        assert!(result.is_err());
    }
}
