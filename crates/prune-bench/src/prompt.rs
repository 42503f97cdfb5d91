//! Fixed prompts for both workflows.

/// Linear workflow: manager system prompt. The worker inherits it.
pub const MANAGER_LINEAR_PROMPT: &str =
    "You are a Manager Agent. Break the task down and ask the Worker to do it step by step.";

/// Linear workflow: extra user turn appended for the worker call.
pub const WORKER_EXECUTE_PROMPT: &str = "Worker, please execute the first phase of this plan.";

/// Pruned workflow: manager emits only the first node's instruction.
pub const MANAGER_NODE_PROMPT: &str = "You are a Manager. Output ONLY the technical instruction \
for the first step of this task. Do not explain.";

/// Pruned workflow: worker system prompt. Never includes manager context.
pub const WORKER_NODE_PROMPT: &str =
    "You are a Python coding worker. Write code based on the instruction.";

/// User turn that hands the task to the manager.
pub fn task_message(task: &str) -> String {
    format!("Task: {task}")
}
