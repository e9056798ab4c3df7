//! Plain-text status view of a run report.

use std::fmt::Write;

use crate::pipeline::PipelineStatus;

use super::run_report::RunReport;

/// File name of the status view inside the report directory.
pub const STATUS_FILE: &str = "status.txt";

fn pipeline_char(status: PipelineStatus) -> char {
    match status {
        PipelineStatus::Pending => '○',
        PipelineStatus::Running => '◉',
        PipelineStatus::Completed => '✓',
        PipelineStatus::Failed => '✗',
        PipelineStatus::Skipped => '⊘',
    }
}

/// Render one line per pipeline and step, errors indented below their step.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();

    let started = report
        .started_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(out, "Run started: {}", started);
    if let Some(secs) = report.duration_in_seconds {
        let _ = writeln!(out, "Duration: {:.0}s", secs);
    }
    let _ = writeln!(out);

    for pipeline in &report.pipelines {
        let _ = writeln!(
            out,
            "{} {} ({})",
            pipeline_char(pipeline.status),
            pipeline.name,
            pipeline.status
        );
        for step in &pipeline.steps {
            let _ = writeln!(
                out,
                "    {} {} ({})",
                step.status.display_char(),
                step.name,
                step.status
            );
            for error in &step.errors {
                match &error.error_type {
                    Some(kind) => {
                        let _ = writeln!(out, "        [{}] {}", kind, error.message);
                    }
                    None => {
                        let _ = writeln!(out, "        {}", error.message);
                    }
                }
            }
        }
    }

    out
}
