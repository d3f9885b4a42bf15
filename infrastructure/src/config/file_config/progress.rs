//! Progress and health-poll configuration from TOML (`[progress]` section)

use serde::{Deserialize, Serialize};
use shoplens_application::{ProgressProfile, WorkflowParams};
use std::time::Duration;

/// Raw progress configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProgressConfig {
    /// Show progress indicators
    pub show_progress: bool,
    /// Step cadence while detecting, in milliseconds
    pub detection_step_ms: u64,
    /// Step cadence while analyzing or chatting, in milliseconds
    pub analysis_step_ms: u64,
    /// Elapsed time before the display switches to "refining", in milliseconds
    pub refining_after_ms: Option<u64>,
    /// Backend health poll interval, in seconds
    pub health_poll_seconds: u64,
}

impl Default for FileProgressConfig {
    fn default() -> Self {
        let detection = ProgressProfile::detection();
        let analysis = ProgressProfile::analysis();
        Self {
            show_progress: true,
            detection_step_ms: detection.step_interval.as_millis() as u64,
            analysis_step_ms: analysis.step_interval.as_millis() as u64,
            refining_after_ms: analysis.refining_after.map(|d| d.as_millis() as u64),
            health_poll_seconds: WorkflowParams::default().health_poll_interval.as_secs(),
        }
    }
}

impl FileProgressConfig {
    /// Build workflow parameters from this section.
    pub fn to_workflow_params(&self) -> WorkflowParams {
        let detection = ProgressProfile {
            step_interval: Duration::from_millis(self.detection_step_ms),
            ..ProgressProfile::detection()
        };
        let analysis = ProgressProfile {
            step_interval: Duration::from_millis(self.analysis_step_ms),
            refining_after: self.refining_after_ms.map(Duration::from_millis),
            ..ProgressProfile::analysis()
        };
        WorkflowParams::default()
            .with_detection_progress(detection)
            .with_analysis_progress(analysis)
            .with_health_poll_interval(Duration::from_secs(self.health_poll_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_workflow_params() {
        let params = FileProgressConfig::default().to_workflow_params();
        assert_eq!(params, WorkflowParams::default());
    }

    #[test]
    fn test_custom_cadence() {
        let config = FileProgressConfig {
            analysis_step_ms: 250,
            refining_after_ms: None,
            ..Default::default()
        };
        let params = config.to_workflow_params();
        assert_eq!(
            params.analysis_progress.step_interval,
            Duration::from_millis(250)
        );
        assert_eq!(params.analysis_progress.refining_after, None);
        assert_eq!(params.analysis_progress.max_step, 4);
    }
}
