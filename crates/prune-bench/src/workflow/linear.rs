//! Baseline workflow: the worker sees the manager's full conversation.

use tracing::info;

use super::{Step, WorkflowKind, WorkflowResult, finish, run_step, skip_step};
use crate::config::BenchConfig;
use crate::events::{BenchEvent, EventHandler};
use crate::prompt::{MANAGER_LINEAR_PROMPT, WORKER_EXECUTE_PROMPT, task_message};
use crate::usage::UsageTracker;
use crate::{ChatBackend, Message};

/// Opening conversation: manager system prompt plus the task.
pub fn manager_messages(config: &BenchConfig) -> Vec<Message> {
    vec![
        Message::system(MANAGER_LINEAR_PROMPT),
        Message::user(task_message(&config.task)),
    ]
}

/// Worker conversation: a copy of the whole history plus the execute turn.
pub fn worker_messages(history: &[Message]) -> Vec<Message> {
    let mut messages = history.to_vec();
    messages.push(Message::user(WORKER_EXECUTE_PROMPT));
    messages
}

/// Run the baseline: manager plans, worker executes with full history.
pub async fn run_linear_workflow<B: ChatBackend + ?Sized>(
    backend: &B,
    config: &BenchConfig,
    handler: &dyn EventHandler,
) -> WorkflowResult {
    const WORKFLOW: WorkflowKind = WorkflowKind::Linear;
    handler.on_event(&BenchEvent::WorkflowStart { workflow: WORKFLOW });
    info!("Linear workflow: manager={}, worker={}", config.manager_model, config.worker_model);

    let mut tracker = UsageTracker::new();
    let mut conversation = manager_messages(config);

    let plan = run_step(
        backend,
        WORKFLOW,
        Step::Manager,
        &config.manager_model,
        &conversation,
        &mut tracker,
        handler,
    )
    .await;

    match plan {
        Some(plan) => {
            conversation.push(Message::assistant(plan.content));
            let worker_conversation = worker_messages(&conversation);
            // The worker's reply is measured, not kept.
            run_step(
                backend,
                WORKFLOW,
                Step::Worker,
                &config.worker_model,
                &worker_conversation,
                &mut tracker,
                handler,
            )
            .await;
        }
        None => skip_step(WORKFLOW, Step::Worker, &mut tracker, handler),
    }

    finish(WORKFLOW, &tracker, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;

    #[test]
    fn manager_conversation_seeds_system_and_task() {
        let config = BenchConfig::default().with_task("sort a list");
        let messages = manager_messages(&config);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].content, "Task: sort a list");
    }

    #[test]
    fn worker_conversation_extends_full_history() {
        let mut history = manager_messages(&BenchConfig::default());
        history.push(Message::assistant("1. make window"));
        let worker = worker_messages(&history);

        assert_eq!(worker.len(), 4);
        assert_eq!(&worker[..3], &history[..]);
        assert_eq!(worker[3], Message::user(WORKER_EXECUTE_PROMPT));
    }
}
