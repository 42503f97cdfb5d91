//! The two workflows under comparison and the trial driver.
//!
//! Both workflows make exactly two calls, manager then worker, strictly in
//! sequence:
//!
//! - [`linear`]: the worker receives a copy of the manager's whole
//!   conversation plus one extra user turn.
//! - [`pruned`]: the worker receives a fresh two-message conversation whose
//!   only user turn is the manager's distilled node instruction.
//!
//! Failed calls add nothing to a workflow's totals. They are counted in
//! [`WorkflowResult::failed_calls`], and a worker step that has no manager
//! output to work from is skipped and counted in
//! [`WorkflowResult::skipped_calls`].

pub mod linear;
pub mod pruned;

use std::time::Duration;

use crate::config::BenchConfig;
use crate::events::{BenchEvent, EventHandler};
use crate::usage::UsageTracker;
use crate::{ChatBackend, ChatResult, Message};

pub use linear::run_linear_workflow;
pub use pruned::run_pruned_workflow;

/// Which workflow an event or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    /// Full-history baseline.
    Linear,
    /// Context-pruned graph workflow.
    Pruned,
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowKind::Linear => write!(f, "baseline"),
            WorkflowKind::Pruned => write!(f, "graph"),
        }
    }
}

/// Which role made a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Manager,
    Worker,
}

impl Step {
    /// Capitalized name for progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Manager => "Manager",
            Step::Worker => "Worker",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Manager => write!(f, "manager"),
            Step::Worker => write!(f, "worker"),
        }
    }
}

/// Aggregate cost of one workflow run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowResult {
    /// Sum of successful call durations.
    pub total_duration: Duration,
    /// Sum of prompt + generated tokens over successful calls.
    pub total_tokens: u64,
    /// Successful calls.
    pub calls: u32,
    pub failed_calls: u32,
    pub skipped_calls: u32,
}

impl WorkflowResult {
    /// Whether every call ran and succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed_calls == 0 && self.skipped_calls == 0
    }
}

/// One linear run and one pruned run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub baseline: WorkflowResult,
    pub graph: WorkflowResult,
}

impl Trial {
    /// Whether both workflows ran every call successfully.
    pub fn is_complete(&self) -> bool {
        self.baseline.is_complete() && self.graph.is_complete()
    }
}

/// Run the linear workflow, then the pruned one.
pub async fn run_trial<B: ChatBackend + ?Sized>(
    backend: &B,
    config: &BenchConfig,
    handler: &dyn EventHandler,
) -> Trial {
    let baseline = run_linear_workflow(backend, config, handler).await;
    let graph = run_pruned_workflow(backend, config, handler).await;
    Trial { baseline, graph }
}

/// Run `config.trials` trials back to back.
pub async fn run_trials<B: ChatBackend + ?Sized>(
    backend: &B,
    config: &BenchConfig,
    handler: &dyn EventHandler,
) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(config.trials as usize);
    for trial in 1..=config.trials {
        handler.on_event(&BenchEvent::TrialStart {
            trial,
            trials: config.trials,
        });
        trials.push(run_trial(backend, config, handler).await);
    }
    trials
}

/// Issue one call, record it, and report it. `None` on failure.
pub(crate) async fn run_step<B: ChatBackend + ?Sized>(
    backend: &B,
    workflow: WorkflowKind,
    step: Step,
    model: &str,
    messages: &[Message],
    tracker: &mut UsageTracker,
    handler: &dyn EventHandler,
) -> Option<ChatResult> {
    match backend.chat(model, messages).await {
        Ok(result) => {
            tracker.record(&result);
            handler.on_event(&BenchEvent::CallFinished {
                workflow,
                step,
                model,
                result: &result,
            });
            Some(result)
        }
        Err(error) => {
            tracker.record_failure();
            handler.on_event(&BenchEvent::CallFailed {
                workflow,
                step,
                model,
                error: &error,
            });
            None
        }
    }
}

/// Record a skipped step and report it.
pub(crate) fn skip_step(
    workflow: WorkflowKind,
    step: Step,
    tracker: &mut UsageTracker,
    handler: &dyn EventHandler,
) {
    tracker.record_skip();
    handler.on_event(&BenchEvent::StepSkipped { workflow, step });
}

/// Close out a workflow: build its result and report it.
pub(crate) fn finish(
    workflow: WorkflowKind,
    tracker: &UsageTracker,
    handler: &dyn EventHandler,
) -> WorkflowResult {
    let result = tracker.finish();
    tracing::debug!("{workflow}: {}", tracker.summary());
    handler.on_event(&BenchEvent::WorkflowFinished {
        workflow,
        result: &result,
    });
    result
}
