//! Simulated progress for remote calls.
//!
//! The service gives no real progress signal, so a ticker advances a step
//! counter on a fixed cadence while the call is in flight. The ticker is a
//! guard: [`ProgressTicker::finish`] or dropping it stops the task, and once
//! stopped no further step is reported.

use crate::config::ProgressProfile;
use crate::ports::progress::WorkflowProgressNotifier;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug, Default)]
struct TickerState {
    step: usize,
    refining: bool,
    stopped: bool,
}

/// Starts progress tickers for a given cadence.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSimulator {
    profile: ProgressProfile,
}

impl ProgressSimulator {
    pub fn new(profile: ProgressProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ProgressProfile {
        &self.profile
    }

    /// Spawn the ticking task. Must be called inside a tokio runtime.
    pub fn start(&self, notifier: Arc<dyn WorkflowProgressNotifier>) -> ProgressTicker {
        let profile = self.profile;
        let state = Arc::new(Mutex::new(TickerState::default()));
        let cancel = CancellationToken::new();

        notifier.on_progress_start(&profile);
        notifier.on_step(0);

        let task = tokio::spawn(run_ticker(
            profile,
            Instant::now(),
            Arc::clone(&state),
            Arc::clone(&notifier),
            cancel.clone(),
        ));

        ProgressTicker {
            profile,
            state,
            notifier,
            cancel,
            task: Some(task),
        }
    }
}

async fn run_ticker(
    profile: ProgressProfile,
    started: Instant,
    state: Arc<Mutex<TickerState>>,
    notifier: Arc<dyn WorkflowProgressNotifier>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(started + profile.step_interval, profile.step_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.stopped {
                    break;
                }
                if state.step < profile.max_step {
                    state.step += 1;
                    trace!(step = state.step, "progress step");
                    notifier.on_step(state.step);
                }
                let refining_due = profile
                    .refining_after
                    .is_some_and(|after| started.elapsed() >= after);
                if refining_due && !state.refining {
                    state.refining = true;
                    notifier.on_refining();
                }
            }
        }
    }
}

/// Handle to a running progress simulation.
pub struct ProgressTicker {
    profile: ProgressProfile,
    state: Arc<Mutex<TickerState>>,
    notifier: Arc<dyn WorkflowProgressNotifier>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Current step value.
    pub fn step(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).step
    }

    pub fn is_refining(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).refining
    }

    /// Stop ticking and report the settled step.
    ///
    /// On success the step jumps to the completed value; on failure it stays
    /// where the simulation left it. Returns the final step.
    pub fn finish(mut self, success: bool) -> usize {
        let final_step = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.stopped = true;
            if success {
                state.step = self.profile.completed_step();
            }
            state.step
        };
        self.halt();
        self.notifier.on_settled(final_step, success);
        final_step
    }

    fn halt(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stopped = true;
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.halt();
    }
}
