//! Output formatter trait

use shoplens_domain::{AnalysisSession, OutputFormat};

/// Trait for formatting analysis sessions
pub trait OutputFormatter {
    /// Format the complete session
    fn format(&self, session: &AnalysisSession) -> String;

    /// Format as JSON
    fn format_json(&self, session: &AnalysisSession) -> String;

    /// Format in the requested output format
    fn render(&self, session: &AnalysisSession, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(session),
            OutputFormat::Json => self.format_json(session),
        }
    }
}
