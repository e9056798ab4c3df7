//! Command-line interface for labflow.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`theme`] - Terminal styling

pub mod args;
pub mod commands;
pub mod theme;

pub use args::{Cli, Commands, CompletionsArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use theme::LabflowTheme;
