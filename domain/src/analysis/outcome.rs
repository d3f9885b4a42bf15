//! Analysis outcome value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Verdict of an analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Objects detected, waiting for the user to pick one
    #[default]
    PendingSelection,
    HighlyRecommended,
    Recommended,
    /// The service suggests looking at alternatives
    #[serde(alias = "consider_alternatives")]
    NeedsAlternatives,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::PendingSelection => "pending_selection",
            AnalysisOutcome::HighlyRecommended => "highly_recommended",
            AnalysisOutcome::Recommended => "recommended",
            AnalysisOutcome::NeedsAlternatives => "needs_alternatives",
        }
    }

    /// Resolve the outcome carried by an analysis payload.
    ///
    /// A report without a recognizable verdict is shown as "consider
    /// alternatives", the same as the dashboard did for anything that was not
    /// explicitly recommended.
    pub fn from_report_value(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(AnalysisOutcome::NeedsAlternatives)
    }

    /// Badge text for display
    pub fn badge(&self) -> &'static str {
        match self {
            AnalysisOutcome::PendingSelection => "SELECT AN OBJECT",
            AnalysisOutcome::HighlyRecommended => "HIGHLY RECOMMENDED",
            AnalysisOutcome::Recommended => "RECOMMENDED",
            AnalysisOutcome::NeedsAlternatives => "CONSIDER ALTERNATIVES",
        }
    }
}

impl FromStr for AnalysisOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending_selection" => Ok(AnalysisOutcome::PendingSelection),
            "highly_recommended" => Ok(AnalysisOutcome::HighlyRecommended),
            "recommended" => Ok(AnalysisOutcome::Recommended),
            "needs_alternatives" | "consider_alternatives" => {
                Ok(AnalysisOutcome::NeedsAlternatives)
            }
            other => Err(format!("unknown analysis outcome: {}", other)),
        }
    }
}

impl std::fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
