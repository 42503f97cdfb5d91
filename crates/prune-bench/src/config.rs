//! Benchmark configuration.
//!
//! [`BenchConfig`] replaces the module-level constants of a one-off script:
//! every workflow takes the config explicitly, so tests and the CLI can point
//! the benchmark at other models or endpoints.
//!
//! # Examples
//!
//! ```
//! use prune_bench::config::BenchConfig;
//!
//! let config = BenchConfig::default()
//!     .with_models("qwen2.5:7b", "qwen2.5:0.5b")
//!     .with_trials(5);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::{
    ChatOptions, DEFAULT_MANAGER_MODEL, DEFAULT_NUM_CTX, DEFAULT_TASK, DEFAULT_TEMPERATURE,
    DEFAULT_WORKER_MODEL, OLLAMA_URL,
};

/// Label shown in the start banner when no device is configured.
pub const UNKNOWN_DEVICE: &str = "device: unknown";

/// Settings for a benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Full URL of the chat endpoint. Default: [`OLLAMA_URL`].
    pub endpoint: String,
    /// Model that plans. Default: `"llama3.2"`.
    pub manager_model: String,
    /// Model that executes. Default: `"llama3.2:1b"`.
    pub worker_model: String,
    /// Task given to the manager in both workflows.
    pub task: String,
    /// Context window forced on every call. Default: `4096`.
    pub num_ctx: u32,
    /// Sampling temperature. Default: `0.2`.
    pub temperature: f32,
    /// Overall request timeout. `None` leaves the HTTP client unbounded.
    pub timeout: Option<Duration>,
    /// Number of times both workflows run. Default: `1`.
    pub trials: u32,
    /// Hardware label for the start banner. `None` prints [`UNKNOWN_DEVICE`].
    pub device: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            endpoint: OLLAMA_URL.to_string(),
            manager_model: DEFAULT_MANAGER_MODEL.to_string(),
            worker_model: DEFAULT_WORKER_MODEL.to_string(),
            task: DEFAULT_TASK.to_string(),
            num_ctx: DEFAULT_NUM_CTX,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
            trials: 1,
            device: None,
        }
    }
}

impl BenchConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the manager and worker models.
    pub fn with_models(mut self, manager: impl Into<String>, worker: impl Into<String>) -> Self {
        self.manager_model = manager.into();
        self.worker_model = worker.into();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = num_ctx;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Sampling options for every request.
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            num_ctx: self.num_ctx,
            temperature: self.temperature,
        }
    }

    /// Device label for the start banner.
    pub fn device_label(&self) -> &str {
        self.device
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(UNKNOWN_DEVICE)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.manager_model.trim().is_empty() {
            return Err(ConfigError::EmptyModel("manager"));
        }
        if self.worker_model.trim().is_empty() {
            return Err(ConfigError::EmptyModel("worker"));
        }
        if self.task.trim().is_empty() {
            return Err(ConfigError::EmptyTask);
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
