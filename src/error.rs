//! Error types for labflow operations.
//!
//! This module defines [`LabflowError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Step-level failures are classified by the step executor and surface as
//!   [`LabflowError::PipelineFailed`] to the orchestrator
//! - Only [`LabflowError::CircularDependency`] aborts a whole run
//! - Use `anyhow::Error` (via `LabflowError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for labflow operations.
#[derive(Debug, Error)]
pub enum LabflowError {
    /// Failed to parse a definition or settings file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid definition structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Pipeline type has no entry in the step registry.
    #[error("Unknown pipeline type '{kind}' in pipeline '{pipeline}'")]
    UnknownPipelineType { pipeline: String, kind: String },

    /// Step type has no registered constructor.
    #[error("Unknown step type '{kind}' for step '{step}'")]
    UnknownStepType { step: String, kind: String },

    /// Contradictory after/before declarations between pipelines.
    #[error("Recursive dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A step returned without an error but did not report completion.
    #[error("Step '{step}' ended incomplete")]
    IncompleteStep { step: String },

    /// A step failed fatally.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// A pipeline could not be executed to completion.
    #[error("Pipeline '{pipeline}' failed: {reason}")]
    PipelineFailed { pipeline: String, reason: String },

    /// Shell command could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for labflow operations.
pub type Result<T> = std::result::Result<T, LabflowError>;
