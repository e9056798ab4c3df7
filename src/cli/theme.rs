//! Terminal styling for command output.

use console::Style;

use crate::pipeline::PipelineStatus;

/// Styles used by the CLI commands.
#[derive(Debug, Clone)]
pub struct LabflowTheme {
    /// Completed pipelines (green).
    pub success: Style,
    /// Skipped pipelines (orange).
    pub warning: Style,
    /// Failures (red bold).
    pub error: Style,
    /// Secondary text.
    pub dim: Style,
    /// Headers (bold magenta).
    pub header: Style,
}

impl Default for LabflowTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl LabflowTheme {
    /// The colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().magenta(),
        }
    }

    /// A theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
        }
    }

    /// Pick the theme for the current terminal.
    pub fn detect(no_color: bool) -> Self {
        if !no_color && should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Style for a pipeline status.
    pub fn status(&self, status: PipelineStatus) -> &Style {
        match status {
            PipelineStatus::Completed => &self.success,
            PipelineStatus::Skipped => &self.warning,
            PipelineStatus::Failed => &self.error,
            PipelineStatus::Pending | PipelineStatus::Running => &self.dim,
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_adds_no_escapes() {
        let theme = LabflowTheme::plain();
        assert_eq!(theme.error.apply_to("failed").to_string(), "failed");
    }

    #[test]
    fn status_style_follows_status() {
        let theme = LabflowTheme::plain();
        let text = theme.status(PipelineStatus::Skipped).apply_to("skipped");
        assert_eq!(text.to_string(), "skipped");
    }
}
