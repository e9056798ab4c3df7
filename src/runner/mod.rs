//! Pipeline ordering and execution.
//!
//! - [`DependencyGraph`] turns `after`/`before` declarations into a stable
//!   execution order
//! - [`StepExecutor`] runs one pipeline's step chain
//! - [`PipelineOrchestrator`] walks the order and contains failures

pub mod dependency;
pub mod executor;
pub mod orchestrator;

pub use dependency::DependencyGraph;
pub use executor::{invocation_parameters, StepExecutor};
pub use orchestrator::{CommandOutcome, ManagerCommand, PipelineOrchestrator, RunSummary};
