//! labflow - dependency-ordered pipeline runner for lab data projects.
//!
//! A project directory holds one YAML definition per pipeline. Each
//! pipeline is a linear chain of typed steps and may declare that it runs
//! `after` or `before` another pipeline. labflow orders the pipelines,
//! runs their chains, skips work already flagged complete, and writes a
//! run report.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Project settings and pipeline definition loading
//! - [`error`] - Error types and result aliases
//! - [`flags`] - Persisted step completion flags
//! - [`pipeline`] - Pipeline and step models
//! - [`report`] - Run reports and the status view
//! - [`runner`] - Ordering, step execution and orchestration
//! - [`shell`] - Shell command execution
//! - [`steps`] - Step runners and the type registry
//!
//! # Example
//!
//! ```
//! use labflow::config::StepParameters;
//! use labflow::flags::MemoryFlagStore;
//! use labflow::pipeline::{Pipeline, PipelineStatus};
//! use labflow::report::RunReport;
//! use labflow::runner::PipelineOrchestrator;
//! use labflow::steps::StepRegistry;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let pipelines = vec![
//!     Pipeline::new("measure", "default", temp.path().join("measure"))
//!         .run_after("illum")
//!         .with_step("count", "noop", StepParameters::new()),
//!     Pipeline::new("illum", "default", temp.path().join("illum"))
//!         .with_step("correct", "noop", StepParameters::new()),
//! ];
//!
//! let registry = StepRegistry::with_builtins();
//! let mut flags = MemoryFlagStore::new();
//! let mut report = RunReport::new();
//! let mut orchestrator = PipelineOrchestrator::new(
//!     pipelines,
//!     &registry,
//!     &mut flags,
//!     &mut report,
//!     temp.path().join("reports"),
//! );
//!
//! let summary = orchestrator.run_all().unwrap();
//! assert_eq!(summary.order, vec!["illum", "measure"]);
//! assert_eq!(
//!     orchestrator.pipeline("measure").unwrap().status(),
//!     PipelineStatus::Completed
//! );
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod flags;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod shell;
pub mod steps;

pub use error::{LabflowError, Result};
