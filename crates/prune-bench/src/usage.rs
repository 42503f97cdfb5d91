//! Duration and token accounting for one workflow run.
//!
//! Only successful calls add to the totals. Failed and skipped calls are
//! counted on the side so the report can flag an incomplete workflow instead
//! of presenting it as cheap.

use std::time::Duration;

use crate::ChatResult;
use crate::workflow::WorkflowResult;

/// Cumulative usage for a workflow.
#[derive(Debug, Default, Clone)]
pub struct UsageTracker {
    pub total_duration: Duration,
    pub total_prompt_tokens: u64,
    pub total_generated_tokens: u64,
    pub calls: u32,
    pub failed_calls: u32,
    pub skipped_calls: u32,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call.
    pub fn record(&mut self, result: &ChatResult) {
        self.total_duration += result.duration;
        self.total_prompt_tokens += result.prompt_tokens as u64;
        self.total_generated_tokens += result.generated_tokens as u64;
        self.calls += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed_calls += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_calls += 1;
    }

    /// Prompt plus generated tokens over all successful calls.
    pub fn total_tokens(&self) -> u64 {
        self.total_prompt_tokens + self.total_generated_tokens
    }

    pub fn finish(&self) -> WorkflowResult {
        WorkflowResult {
            total_duration: self.total_duration,
            total_tokens: self.total_tokens(),
            calls: self.calls,
            failed_calls: self.failed_calls,
            skipped_calls: self.skipped_calls,
        }
    }

    /// Format as a short summary string.
    pub fn summary(&self) -> String {
        format!(
            "tokens: {} prompt + {} generated = {} total in {:.2}s, calls: {} ok, {} failed, {} skipped",
            self.total_prompt_tokens,
            self.total_generated_tokens,
            self.total_tokens(),
            self.total_duration.as_secs_f64(),
            self.calls,
            self.failed_calls,
            self.skipped_calls,
        )
    }
}
