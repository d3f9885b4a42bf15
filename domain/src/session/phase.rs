//! Workflow phases of an analysis session.
//!
//! ```text
//! Idle ──> Detecting ──> AwaitingSelection ──> Identifying ──> DeepAnalyzing ──> Complete
//!                              │    └───────────── cache hit ──────────────────────┘
//!                              └──> Chatting ──> Complete
//! ```
//!
//! Any failure returns to `AwaitingSelection`, or `Idle` when there is
//! nothing to select from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Detecting,
    AwaitingSelection,
    Identifying,
    DeepAnalyzing,
    Chatting,
    Complete,
}

impl WorkflowPhase {
    /// A remote call is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            WorkflowPhase::Detecting
                | WorkflowPhase::Identifying
                | WorkflowPhase::DeepAnalyzing
                | WorkflowPhase::Chatting
        )
    }

    /// Phase to fall back to after a failed call.
    pub fn recovery(can_select: bool) -> Self {
        if can_select {
            WorkflowPhase::AwaitingSelection
        } else {
            WorkflowPhase::Idle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::Detecting => "detecting",
            WorkflowPhase::AwaitingSelection => "awaiting_selection",
            WorkflowPhase::Identifying => "identifying",
            WorkflowPhase::DeepAnalyzing => "deep_analyzing",
            WorkflowPhase::Chatting => "chatting",
            WorkflowPhase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_phases() {
        assert!(WorkflowPhase::Detecting.is_in_flight());
        assert!(WorkflowPhase::DeepAnalyzing.is_in_flight());
        assert!(!WorkflowPhase::AwaitingSelection.is_in_flight());
        assert!(!WorkflowPhase::Complete.is_in_flight());
    }

    #[test]
    fn test_recovery() {
        assert_eq!(WorkflowPhase::recovery(true), WorkflowPhase::AwaitingSelection);
        assert_eq!(WorkflowPhase::recovery(false), WorkflowPhase::Idle);
    }
}
