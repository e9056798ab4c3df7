//! Step types and runners.
//!
//! - [`StepRunner`] - the contract every step backend implements
//! - [`StepOutcome`] / [`ErrorRecord`] - what a runner reports back
//! - [`StepRegistry`] - explicit mapping from type identifiers to runners
//!
//! # Example
//!
//! ```
//! use labflow::config::StepParameters;
//! use labflow::steps::{ErrorRecord, StepOutcome, StepRegistry, StepRunner};
//!
//! struct Flaky;
//!
//! impl StepRunner for Flaky {
//!     fn run(&self, _: &StepParameters) -> labflow::Result<StepOutcome> {
//!         Ok(StepOutcome::Failed(ErrorRecord::new("retry later").with_message_type("warning")))
//!     }
//! }
//!
//! let mut registry = StepRegistry::with_builtins();
//! registry.register_step("flaky", |_| Ok(Box::new(Flaky)));
//! assert!(registry.contains_step("flaky"));
//! ```

pub mod builtin;
pub mod registry;
pub mod runner;

pub use builtin::{CommandRunner, NoopRunner};
pub use registry::{RunnerConstructor, StepRegistry};
pub use runner::{ErrorRecord, StepOutcome, StepRunner, FATAL_MESSAGE_TYPE};
