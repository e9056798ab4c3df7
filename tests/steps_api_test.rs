//! Integration tests for the steps public API.

use labflow::config::StepParameters;
use labflow::pipeline::Step;
use labflow::steps::{StepOutcome, StepRegistry, StepRunner};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn step(kind: &str) -> Step {
    Step {
        name: "s".to_string(),
        kind: kind.to_string(),
        default_parameters: StepParameters::new(),
    }
}

fn params(value: Value) -> StepParameters {
    value.as_object().cloned().unwrap()
}

#[test]
fn command_step_runs_in_pipeline_path() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("illum");
    let registry = StepRegistry::with_builtins();
    let runner = registry.create(&step("command")).unwrap();

    let outcome = runner
        .run(&params(json!({
            "command": "echo \"$LABFLOW_STEP\" > step.txt",
            "pipeline_path": output.display().to_string(),
            "step_name": "illum-correct",
        })))
        .unwrap();

    assert_eq!(outcome, StepOutcome::Completed);
    let written = fs::read_to_string(output.join("step.txt")).unwrap();
    assert_eq!(written.trim(), "illum-correct");
}

#[test]
fn failing_command_reports_known_fatal_error() {
    let temp = TempDir::new().unwrap();
    let registry = StepRegistry::with_builtins();
    let runner = registry.create(&step("command")).unwrap();

    let outcome = runner
        .run(&params(json!({
            "command": "echo oops >&2; exit 4",
            "pipeline_path": temp.path().display().to_string(),
        })))
        .unwrap();

    match outcome {
        StepOutcome::Failed(record) => {
            assert!(record.is_fatal());
            assert_eq!(record.error_type.as_deref(), Some("command_failed"));
            assert_eq!(record.fields["exit_code"], "4");
            assert_eq!(record.fields["stderr"], "oops");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn on_failure_downgrades_severity() {
    let temp = TempDir::new().unwrap();
    let registry = StepRegistry::with_builtins();
    let runner = registry.create(&step("command")).unwrap();

    let outcome = runner
        .run(&params(json!({
            "command": "exit 1",
            "on_failure": "warning",
            "pipeline_path": temp.path().display().to_string(),
        })))
        .unwrap();

    match outcome {
        StepOutcome::Failed(record) => assert!(!record.is_fatal()),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn custom_pipeline_kind_selects_default_step() {
    let mut registry = StepRegistry::with_builtins();
    registry.register_pipeline_kind("placeholder", "noop");
    assert_eq!(registry.default_step_kind("placeholder"), Some("noop"));
}
