//! Progress reporting for the analysis workflow

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use shoplens_application::{ProgressProfile, WorkflowProgressNotifier};
use shoplens_domain::WorkflowPhase;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One stage of the agent pipeline shown while a call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentStep {
    pub label: &'static str,
    pub detail: &'static str,
}

pub const AGENT_STEPS: [AgentStep; 5] = [
    AgentStep {
        label: "Vision Processing",
        detail: "Detecting objects & OCR...",
    },
    AgentStep {
        label: "Discovery Layer",
        detail: "Gathering market data...",
    },
    AgentStep {
        label: "Market Scout",
        detail: "Searching alternatives...",
    },
    AgentStep {
        label: "Skeptic Verify",
        detail: "Checking review authenticity...",
    },
    AgentStep {
        label: "Final Analysis",
        detail: "Scoring & synthesizing...",
    },
];

const MARKET_SCOUT: usize = 2;
pub const REFINING_DETAIL: &str = "Re-scanning market for better options...";
const ANALYZING_HEADER: &str = "Analyzing Your Product";
const REFINING_HEADER: &str = "Deep Search Activated";
const SCANNING_HEADER: &str = "Scanning Image";

/// Detail text for a step, accounting for the refining sub-state.
pub fn step_detail(step: usize, refining: bool) -> Option<&'static str> {
    let agent = AGENT_STEPS.get(step)?;
    if refining && step == MARKET_SCOUT {
        Some(REFINING_DETAIL)
    } else {
        Some(agent.detail)
    }
}

/// `"Label: detail"` for an active step; `None` once every step is done.
pub fn step_message(step: usize, refining: bool) -> Option<String> {
    let agent = AGENT_STEPS.get(step)?;
    let detail = step_detail(step, refining)?;
    Some(format!("{}: {}", agent.label, detail))
}

/// Share of the pipeline completed at `step`, in percent.
pub fn step_percent(step: usize) -> u64 {
    let total = AGENT_STEPS.len();
    (step.min(total) * 100 / total) as u64
}

/// Reports progress with an indicatif bar over the agent steps
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    phase: Mutex<WorkflowPhase>,
    step: AtomicUsize,
    refining: AtomicBool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            phase: Mutex::new(WorkflowPhase::Idle),
            step: AtomicUsize::new(0),
            refining: AtomicBool::new(false),
        }
    }

    fn style(refining: bool) -> ProgressStyle {
        let template = if refining {
            "{spinner:.yellow} {prefix:.bold.yellow} [{bar:30.yellow/white}] {pos}/{len} {msg}"
        } else {
            "{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}"
        };
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn header(phase: WorkflowPhase) -> &'static str {
        match phase {
            WorkflowPhase::Detecting => SCANNING_HEADER,
            _ => ANALYZING_HEADER,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }

    fn refresh_message(&self, bar: &ProgressBar) {
        let step = self.step.load(Ordering::SeqCst);
        let refining = self.refining.load(Ordering::SeqCst);
        bar.set_position(step.min(AGENT_STEPS.len()) as u64);
        if let Some(message) = step_message(step, refining) {
            bar.set_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgressNotifier for ProgressReporter {
    fn on_phase_change(&self, phase: WorkflowPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn on_progress_start(&self, _profile: &ProgressProfile) {
        let phase = *self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        self.step.store(0, Ordering::SeqCst);
        self.refining.store(false, Ordering::SeqCst);

        let bar = ProgressBar::new(AGENT_STEPS.len() as u64);
        bar.set_style(Self::style(false));
        bar.set_prefix(Self::header(phase));
        bar.enable_steady_tick(Duration::from_millis(100));

        let previous = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(bar);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn on_step(&self, step: usize) {
        self.step.store(step, Ordering::SeqCst);
        self.with_bar(|bar| self.refresh_message(bar));
    }

    fn on_refining(&self) {
        self.refining.store(true, Ordering::SeqCst);
        self.with_bar(|bar| {
            bar.set_style(Self::style(true));
            bar.set_prefix(REFINING_HEADER);
            self.refresh_message(bar);
        });
    }

    fn on_settled(&self, final_step: usize, success: bool) {
        let bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(bar) = bar {
            bar.set_position(final_step.min(AGENT_STEPS.len()) as u64);
            if success {
                bar.finish_with_message(format!("{}", "Done".green()));
            } else {
                bar.abandon_with_message(format!("{}", "Failed".red()));
            }
        }
    }
}

/// Plain line-per-step progress (no bar)
pub struct SimpleProgress {
    refining: AtomicBool,
}

impl SimpleProgress {
    pub fn new() -> Self {
        Self {
            refining: AtomicBool::new(false),
        }
    }
}

impl Default for SimpleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgressNotifier for SimpleProgress {
    fn on_phase_change(&self, phase: WorkflowPhase) {
        if phase.is_in_flight() {
            println!("{} {}", "->".cyan(), phase.to_string().bold());
        }
    }

    fn on_progress_start(&self, _profile: &ProgressProfile) {
        self.refining.store(false, Ordering::SeqCst);
    }

    fn on_step(&self, step: usize) {
        if let Some(message) = step_message(step, self.refining.load(Ordering::SeqCst)) {
            println!("  {} ({}%)", message, step_percent(step));
        }
    }

    fn on_refining(&self) {
        self.refining.store(true, Ordering::SeqCst);
        println!("  {} {}", "!".yellow(), REFINING_DETAIL.yellow());
    }

    fn on_settled(&self, _final_step: usize, success: bool) {
        if success {
            println!("  {} done", "v".green());
        } else {
            println!("  {} failed", "x".red());
        }
    }
}
