//! Pruned workflow: the worker sees only the manager's node instruction.
//!
//! The manager is asked for a single terse instruction. The worker then gets
//! a fresh conversation built from that instruction alone: no manager system
//! prompt, no task text, no earlier turns.

use tracing::info;

use super::{Step, WorkflowKind, WorkflowResult, finish, run_step, skip_step};
use crate::config::BenchConfig;
use crate::events::{BenchEvent, EventHandler};
use crate::prompt::{MANAGER_NODE_PROMPT, WORKER_NODE_PROMPT, task_message};
use crate::usage::UsageTracker;
use crate::{ChatBackend, Message};

/// Manager conversation: node-instruction system prompt plus the task.
pub fn manager_messages(config: &BenchConfig) -> Vec<Message> {
    vec![
        Message::system(MANAGER_NODE_PROMPT),
        Message::user(task_message(&config.task)),
    ]
}

/// Worker conversation: exactly a system prompt and the node instruction.
pub fn worker_messages(node_instruction: &str) -> Vec<Message> {
    vec![
        Message::system(WORKER_NODE_PROMPT),
        Message::user(node_instruction),
    ]
}

/// Run the pruned workflow: manager distills, worker executes in isolation.
pub async fn run_pruned_workflow<B: ChatBackend + ?Sized>(
    backend: &B,
    config: &BenchConfig,
    handler: &dyn EventHandler,
) -> WorkflowResult {
    const WORKFLOW: WorkflowKind = WorkflowKind::Pruned;
    handler.on_event(&BenchEvent::WorkflowStart { workflow: WORKFLOW });
    info!("Pruned workflow: manager={}, worker={}", config.manager_model, config.worker_model);

    let mut tracker = UsageTracker::new();
    let manager_conversation = manager_messages(config);

    let node = run_step(
        backend,
        WORKFLOW,
        Step::Manager,
        &config.manager_model,
        &manager_conversation,
        &mut tracker,
        handler,
    )
    .await;

    // An empty instruction would hand the worker an empty user turn.
    let node_instruction = node.map(|n| n.content).filter(|c| !c.trim().is_empty());

    match node_instruction {
        Some(node_instruction) => {
            let worker_conversation = worker_messages(&node_instruction);
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
