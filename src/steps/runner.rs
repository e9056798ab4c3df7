//! The contract between the step executor and step backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::StepParameters;
use crate::error::Result;

/// Marker value of `message_type` that makes an error fatal.
pub const FATAL_MESSAGE_TYPE: &str = "error";

/// A unit of work behind a step type.
///
/// Runners are synchronous. Work queued elsewhere (a cluster, a batch
/// system) is hidden behind the returned [`StepOutcome`].
pub trait StepRunner {
    /// Run the step with the merged invocation parameters.
    ///
    /// An `Err` is an internal fault and always fails the pipeline.
    fn run(&self, parameters: &StepParameters) -> Result<StepOutcome>;
}

/// What a runner reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step's work is done.
    Completed,
    /// The runner returned without error but the work is not done.
    Incomplete,
    /// The runner reported a classified error.
    Failed(ErrorRecord),
}

/// A step failure as reported by a runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human readable message.
    pub message: String,

    /// Tag for known errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Severity marker; `"error"` is fatal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    /// Extra details forwarded to the report.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ErrorRecord {
    /// Create an unclassified, non-fatal record.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Create a record that aborts the pipeline.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(message).with_message_type(FATAL_MESSAGE_TYPE)
    }

    /// Tag the record as a known error.
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Set the severity marker.
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Attach a detail field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Only an explicit `message_type: error` is fatal.
    pub fn is_fatal(&self) -> bool {
        self.message_type.as_deref() == Some(FATAL_MESSAGE_TYPE)
    }

    /// Known errors carry an `error_type`.
    pub fn is_known(&self) -> bool {
        self.error_type.is_some()
    }
}
