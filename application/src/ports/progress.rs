//! Progress notification port
//!
//! Defines the interface for reporting workflow progress. There is no real
//! progress signal from the service; the step callbacks are driven by
//! [`ProgressSimulator`](crate::progress::ProgressSimulator).

use crate::config::ProgressProfile;
use shoplens_domain::WorkflowPhase;

/// Callback for progress updates during an analysis workflow
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, step list, plain text).
pub trait WorkflowProgressNotifier: Send + Sync {
    /// Called when the workflow changes phase
    fn on_phase_change(&self, _phase: WorkflowPhase) {}

    /// Called when a simulated progress run starts
    fn on_progress_start(&self, _profile: &ProgressProfile) {}

    /// Called each time the simulated step advances
    fn on_step(&self, step: usize);

    /// Called once when the run enters the refining sub-state
    fn on_refining(&self) {}

    /// Called when the real call has settled; no step follows this
    fn on_settled(&self, _final_step: usize, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkflowProgressNotifier for NoProgress {
    fn on_step(&self, _step: usize) {}
}
