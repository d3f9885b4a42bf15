//! Workflow parameters: progress cadence, health polling and fallback text.
//!
//! [`WorkflowParams`] groups the static parameters that shape how
//! [`AnalysisWorkflow`](crate::use_cases::analysis_workflow::AnalysisWorkflow)
//! presents itself while remote calls are in flight. None of them change what
//! is sent to the service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed chat answer used when a conversational call fails.
pub const DEFAULT_CHAT_FALLBACK: &str =
    "Sorry, I couldn't analyze that right now. Please try again.";

/// Message surfaced when identifying or analyzing a selected object fails.
pub const DEFAULT_SELECTION_FALLBACK: &str = "Failed to analyze object details.";

/// Cadence of one simulated progress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressProfile {
    /// Time between step increments.
    pub step_interval: Duration,
    /// Highest step the simulation advances to while waiting.
    pub max_step: usize,
    /// Elapsed time after which the display switches to "refining".
    pub refining_after: Option<Duration>,
}

impl ProgressProfile {
    /// Short profile for the detect-only call: stops at the vision step.
    pub fn detection() -> Self {
        Self {
            step_interval: Duration::from_millis(500),
            max_step: 1,
            refining_after: None,
        }
    }

    /// Long profile for deep analysis and chat calls.
    pub fn analysis() -> Self {
        Self {
            step_interval: Duration::from_millis(800),
            max_step: 4,
            refining_after: Some(Duration::from_secs(6)),
        }
    }

    /// Step reported once the real call has succeeded.
    pub fn completed_step(&self) -> usize {
        self.max_step + 1
    }
}

/// Workflow presentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParams {
    pub detection_progress: ProgressProfile,
    pub analysis_progress: ProgressProfile,
    /// How often the backend health probe runs.
    pub health_poll_interval: Duration,
    pub chat_fallback_message: String,
    pub selection_fallback_message: String,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            detection_progress: ProgressProfile::detection(),
            analysis_progress: ProgressProfile::analysis(),
            health_poll_interval: Duration::from_secs(5),
            chat_fallback_message: DEFAULT_CHAT_FALLBACK.to_string(),
            selection_fallback_message: DEFAULT_SELECTION_FALLBACK.to_string(),
        }
    }
}

impl WorkflowParams {
    // ==================== Builder Methods ====================

    pub fn with_detection_progress(mut self, profile: ProgressProfile) -> Self {
        self.detection_progress = profile;
        self
    }

    pub fn with_analysis_progress(mut self, profile: ProgressProfile) -> Self {
        self.analysis_progress = profile;
        self
    }

    pub fn with_health_poll_interval(mut self, interval: Duration) -> Self {
        self.health_poll_interval = interval;
        self
    }

    pub fn with_chat_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.chat_fallback_message = message.into();
        self
    }
}
