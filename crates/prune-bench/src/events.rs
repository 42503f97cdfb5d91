//! Events and handlers for observing a benchmark run.
//!
//! Workflows report progress through [`BenchEvent`] values instead of
//! printing directly. The binary turns them into stdout progress lines via
//! [`progress_line`]; library callers can log them with [`LoggingHandler`]
//! or collect them in tests with [`FnEventHandler`].
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or silent runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use tracing::{debug, info, warn};

use crate::workflow::{Step, WorkflowKind, WorkflowResult};
use crate::{ChatError, ChatResult};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted while trials run.
#[derive(Debug)]
pub enum BenchEvent<'a> {
    /// A trial (one linear run plus one pruned run) is starting. 1-indexed.
    TrialStart { trial: u32, trials: u32 },
    /// A workflow is starting.
    WorkflowStart { workflow: WorkflowKind },
    /// A model call succeeded.
    CallFinished {
        workflow: WorkflowKind,
        step: Step,
        model: &'a str,
        result: &'a ChatResult,
    },
    /// A model call failed and was excluded from the totals.
    CallFailed {
        workflow: WorkflowKind,
        step: Step,
        model: &'a str,
        error: &'a ChatError,
    },
    /// A step was not run because an earlier step produced nothing usable.
    StepSkipped { workflow: WorkflowKind, step: Step },
    /// A workflow finished.
    WorkflowFinished {
        workflow: WorkflowKind,
        result: &'a WorkflowResult,
    },
}

/// Handler for benchmark events.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &BenchEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
pub struct FnEventHandler<F>(F)
where
    F: Fn(&BenchEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&BenchEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&BenchEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &BenchEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to every inner handler in registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &BenchEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// An event handler that logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &BenchEvent<'_>) {
        match event {
            BenchEvent::TrialStart { trial, trials } => {
                info!("Trial {trial}/{trials}");
            }
            BenchEvent::WorkflowStart { workflow } => {
                info!("Starting {workflow} workflow");
            }
            BenchEvent::CallFinished {
                workflow,
                step,
                model,
                result,
            } => {
                debug!(
                    "{workflow}/{step} ({model}): {:.2}s, prompt={}, generated={}, {} chars",
                    result.duration.as_secs_f64(),
                    result.prompt_tokens,
                    result.generated_tokens,
                    result.content.len(),
                );
            }
            BenchEvent::CallFailed {
                workflow,
                step,
                model,
                error,
            } => {
                warn!(
                    "{workflow}/{step} ({model}) failed [{}]: {error}",
                    error.kind()
                );
            }
            BenchEvent::StepSkipped { workflow, step } => {
                warn!("{workflow}/{step} skipped");
            }
            BenchEvent::WorkflowFinished { workflow, result } => {
                info!(
                    "{workflow} workflow finished: {:.2}s, {} tokens ({} failed, {} skipped)",
                    result.total_duration.as_secs_f64(),
                    result.total_tokens,
                    result.failed_calls,
                    result.skipped_calls,
                );
            }
        }
    }
}

// ── Progress lines ─────────────────────────────────────────────────

/// Human-readable stdout line for an event, if it has one.
pub fn progress_line(event: &BenchEvent<'_>) -> Option<String> {
    match event {
        BenchEvent::TrialStart { trial, trials } if *trials > 1 => {
            Some(format!("\n=== Trial {trial}/{trials} ==="))
        }
        BenchEvent::TrialStart { .. } => None,
        BenchEvent::WorkflowStart {
            workflow: WorkflowKind::Linear,
        } => Some("\n[BASELINE] Running Standard Linear History Workflow...".to_string()),
        BenchEvent::WorkflowStart {
            workflow: WorkflowKind::Pruned,
        } => Some("\n[PROPOSED] Running Graph-Based (Context Pruned) Workflow...".to_string()),
        BenchEvent::CallFinished {
            workflow,
            step,
            result,
            ..
        } => {
            let action = match (workflow, step) {
                (WorkflowKind::Linear, Step::Manager) => "Manager planned",
                (WorkflowKind::Linear, Step::Worker) => "Worker executed",
                (WorkflowKind::Pruned, Step::Manager) => "Manager generated Graph Node 1",
                (WorkflowKind::Pruned, Step::Worker) => "Worker executed Node 1",
            };
            Some(format!(
                " > {action} ({:.2}s). Context size: {} tokens.",
                result.duration.as_secs_f64(),
                result.prompt_tokens
            ))
        }
        BenchEvent::CallFailed { error, .. } => Some(format!("Error calling Ollama: {error}")),
        BenchEvent::StepSkipped { step, .. } => Some(format!(
            " > {} skipped: no usable output from the previous step.",
            step.label()
        )),
        BenchEvent::WorkflowFinished { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn sample_result() -> ChatResult {
        ChatResult {
            content: "plan".into(),
            duration: Duration::from_millis(1234),
            prompt_tokens: 57,
            generated_tokens: 9,
        }
    }

    #[test]
    fn progress_line_for_linear_manager() {
        let result = sample_result();
        let line = progress_line(&BenchEvent::CallFinished {
            workflow: WorkflowKind::Linear,
            step: Step::Manager,
            model: "llama3.2",
            result: &result,
        });
        assert_eq!(
            line.as_deref(),
            Some(" > Manager planned (1.23s). Context size: 57 tokens.")
        );
    }

    #[test]
    fn progress_line_for_pruned_worker() {
        let result = sample_result();
        let line = progress_line(&BenchEvent::CallFinished {
            workflow: WorkflowKind::Pruned,
            step: Step::Worker,
            model: "llama3.2:1b",
            result: &result,
        })
        .unwrap();
        assert!(line.starts_with(" > Worker executed Node 1 (1.23s)"));
    }

    #[test]
    fn progress_line_for_failure() {
        let error = ChatError::Network("request failed: connection refused".into());
        let line = progress_line(&BenchEvent::CallFailed {
            workflow: WorkflowKind::Linear,
            step: Step::Worker,
            model: "llama3.2:1b",
            error: &error,
        })
        .unwrap();
        assert!(line.starts_with("Error calling Ollama: network error"));
    }

    #[test]
    fn single_trial_has_no_trial_header() {
        assert!(progress_line(&BenchEvent::TrialStart { trial: 1, trials: 1 }).is_none());
        assert!(progress_line(&BenchEvent::TrialStart { trial: 2, trials: 3 }).is_some());
    }

    #[test]
    fn composite_dispatches_to_all_handlers() {
        use std::sync::Arc;

        let seen = Arc::new(Mutex::new(0u32));
        let a = seen.clone();
        let b = seen.clone();
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(move |_: &BenchEvent<'_>| *a.lock().unwrap() += 1))
            .with(FnEventHandler::new(move |_: &BenchEvent<'_>| *b.lock().unwrap() += 10));

        handler.on_event(&BenchEvent::WorkflowStart {
            workflow: WorkflowKind::Pruned,
        });
        assert_eq!(*seen.lock().unwrap(), 11);
    }
}
