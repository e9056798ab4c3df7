//! Run reporting.
//!
//! The orchestrator and step executor talk to a [`ReportSink`]; the
//! shipped implementation is [`RunReport`], persisted as JSON with a
//! plain-text status view next to it.

pub mod run_report;
pub mod sink;
pub mod status_view;

pub use run_report::{PipelineReport, ReportedError, RunReport, StepReport};
pub use sink::{ErrorFields, ReportSink, StepStatus};
