//! Built-in step runners.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::StepParameters;
use crate::error::Result;
use crate::shell::{execute, CommandOptions};

use super::runner::{ErrorRecord, StepOutcome, StepRunner, FATAL_MESSAGE_TYPE};

/// Completes immediately. Useful as a placeholder step.
#[derive(Debug, Default)]
pub struct NoopRunner;

impl NoopRunner {
    /// Step type identifier.
    pub const KIND: &'static str = "noop";
}

impl StepRunner for NoopRunner {
    fn run(&self, _parameters: &StepParameters) -> Result<StepOutcome> {
        Ok(StepOutcome::Completed)
    }
}

/// Runs the `command` parameter through the platform shell.
///
/// Recognised parameters:
/// - `command` (string, required)
/// - `timeout` (seconds)
/// - `on_failure` (message type of the error on non-zero exit, default `error`)
/// - `env` (mapping of extra environment variables)
///
/// The command runs inside `pipeline_path`, which is created if missing.
#[derive(Debug, Default)]
pub struct CommandRunner;

impl CommandRunner {
    /// Step type identifier.
    pub const KIND: &'static str = "command";
}

impl StepRunner for CommandRunner {
    fn run(&self, parameters: &StepParameters) -> Result<StepOutcome> {
        let step_name = str_param(parameters, "step_name").unwrap_or("?");
        let on_failure = str_param(parameters, "on_failure").unwrap_or(FATAL_MESSAGE_TYPE);

        let Some(command) = str_param(parameters, "command").filter(|c| !c.trim().is_empty())
        else {
            return Ok(StepOutcome::Failed(
                ErrorRecord::fatal(format!("Step '{}' has no command to run", step_name))
                    .with_error_type("missing_command"),
            ));
        };

        let mut options = CommandOptions::default();
        if let Some(path) = str_param(parameters, "pipeline_path") {
            let cwd = PathBuf::from(path);
            fs::create_dir_all(&cwd)?;
            options.cwd = Some(cwd);
        }
        if let Some(secs) = parameters.get("timeout").and_then(Value::as_u64) {
            options.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(Value::Object(env)) = parameters.get("env") {
            for (key, value) in env {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                options.env.insert(key.clone(), value);
            }
        }
        options
            .env
            .insert("LABFLOW_STEP".to_string(), step_name.to_string());

        debug!("Running command for {}: {}", step_name, command);
        let result = execute(command, &options)?;

        if result.success {
            return Ok(StepOutcome::Completed);
        }

        let (error_type, message) = if result.timed_out {
            ("command_timeout", format!("Command timed out: {}", command))
        } else {
            (
                "command_failed",
                format!("Command exited with code {:?}: {}", result.exit_code, command),
            )
        };
        let mut record = ErrorRecord::new(message)
            .with_error_type(error_type)
            .with_message_type(on_failure)
            .with_field("command", command);
        if let Some(code) = result.exit_code {
            record = record.with_field("exit_code", code.to_string());
        }
        let stderr = result.stderr.trim();
        if !stderr.is_empty() {
            record = record.with_field("stderr", stderr);
        }
        Ok(StepOutcome::Failed(record))
    }
}

fn str_param<'a>(parameters: &'a StepParameters, key: &str) -> Option<&'a str> {
    parameters.get(key).and_then(Value::as_str)
}
