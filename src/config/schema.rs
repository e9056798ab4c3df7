//! Configuration schema definitions for labflow.
//!
//! This module contains the struct definitions that map to the YAML
//! project settings file and to pipeline definition files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Parameters handed to a step, as a JSON object.
pub type StepParameters = Map<String, Value>;

/// Project settings from `.labflow/config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Suffix that marks a file in the project root as a pipeline definition.
    pub pipe_extension: String,

    /// Where run reports and the status view are written (relative to the project root).
    pub report_dir: PathBuf,

    /// Root for step completion flags (relative to the project root).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_prefix: Option<PathBuf>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            pipe_extension: default_pipe_extension(),
            report_dir: PathBuf::from(".labflow").join("reports"),
            flag_prefix: None,
        }
    }
}

fn default_pipe_extension() -> String {
    ".pipe.yml".to_string()
}

fn default_pipeline_type() -> String {
    "default".to_string()
}

/// A pipeline definition file.
///
/// ```yaml
/// name: segmentation
/// type: default
/// after: illumination
/// chain:
///   - name: stitch
///     type: command
///     default_parameters:
///       command: ./stitch.sh
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Unique pipeline name. Defaults to the file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Pipeline type; selects the default step type.
    #[serde(rename = "type", default = "default_pipeline_type")]
    pub kind: String,

    /// Run after the named pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Run before the named pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Ordered steps.
    #[serde(default)]
    pub chain: Vec<StepDefinition>,
}

/// One entry of a pipeline chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step name. Defaults to the step type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Step type. Defaults to the pipeline type's default step type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Parameters merged into every invocation of this step.
    #[serde(default)]
    pub default_parameters: StepParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let settings = ProjectSettings::default();
        assert_eq!(settings.pipe_extension, ".pipe.yml");
        assert_eq!(settings.report_dir, PathBuf::from(".labflow/reports"));
        assert!(settings.flag_prefix.is_none());
    }

    #[test]
    fn settings_partial_yaml_keeps_defaults() {
        let settings: ProjectSettings = serde_yaml::from_str("pipe_extension: .br").unwrap();
        assert_eq!(settings.pipe_extension, ".br");
        assert_eq!(settings.report_dir, PathBuf::from(".labflow/reports"));
    }

    #[test]
    fn definition_parses_full_yaml() {
        let yaml = r#"
name: segmentation
type: default
after: illumination
chain:
  - name: stitch
    type: command
    default_parameters:
      command: ./stitch.sh
      retries: 2
  - type: noop
"#;
        let def: PipelineDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.name.as_deref(), Some("segmentation"));
        assert_eq!(def.after.as_deref(), Some("illumination"));
        assert!(def.before.is_none());
        assert_eq!(def.chain.len(), 2);
        assert_eq!(def.chain[0].kind.as_deref(), Some("command"));
        assert_eq!(def.chain[0].default_parameters["retries"], 2);
        assert!(def.chain[1].name.is_none());
    }

    #[test]
    fn definition_type_defaults() {
        let def: PipelineDefinition = serde_yaml::from_str("chain: []").unwrap();
        assert_eq!(def.kind, "default");
        assert!(def.chain.is_empty());
    }
}
