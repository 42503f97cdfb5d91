//! Benchmark for context pruning in two-model manager/worker workflows.
//!
//! `prune-bench` runs the same task through two prompting strategies against
//! a local [Ollama](https://ollama.com/) server and compares how long each
//! took and how many tokens the server processed:
//!
//! - the **linear** workflow ([`workflow::linear`]) hands the worker model the
//!   manager's full conversation, and
//! - the **pruned** workflow ([`workflow::pruned`]) hands the worker only the
//!   single instruction the manager distilled for it.
//!
//! # Getting started
//!
//! ```ignore
//! use prune_bench::config::BenchConfig;
//! use prune_bench::events::LoggingHandler;
//! use prune_bench::report::Report;
//! use prune_bench::workflow::run_trials;
//! use prune_bench::OllamaClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BenchConfig::default().with_trials(3);
//!     let client = OllamaClient::from_config(&config)?;
//!
//!     let trials = run_trials(&client, &config, &LoggingHandler).await;
//!     println!("{}", Report::from_trials(&trials).render());
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! | Module | Description |
//! |--------|-------------|
//! | crate root | [`Message`] types, [`ChatRequest`], [`OllamaClient`], and the [`ChatBackend`] seam |
//! | [`config`] | [`BenchConfig`](config::BenchConfig): endpoint, models, task, sampling options |
//! | [`workflow`] | Linear and pruned workflows, trial driver |
//! | [`events`] | [`BenchEvent`](events::BenchEvent) observer hooks and progress lines |
//! | [`usage`] | Per-workflow duration/token accounting |
//! | [`report`] | Comparison metrics and the fixed-width results table |
//! | [`stats`] | Mean and standard deviation over repeated trials |

pub mod config;
pub mod error;
pub mod events;
pub mod prompt;
pub mod report;
pub mod stats;
pub mod usage;
pub mod workflow;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use error::{ChatError, ConfigError, ReportError};

// ── Constants ──────────────────────────────────────────────────────

/// Ollama chat endpoint on the default local port.
pub const OLLAMA_URL: &str = "http://localhost:11434/api/chat";

/// Planning model (3B).
pub const DEFAULT_MANAGER_MODEL: &str = "llama3.2";

/// Executing model (1B).
pub const DEFAULT_WORKER_MODEL: &str = "llama3.2:1b";

/// Task both workflows are asked to solve.
pub const DEFAULT_TASK: &str =
    "Write a Python script for a simple Snake game using the pygame library.";

/// Context window forced on every call.
pub const DEFAULT_NUM_CTX: u32 = 4096;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────

/// Sampling options sent under `options` in every request.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ChatOptions {
    pub num_ctx: u32,
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            num_ctx: DEFAULT_NUM_CTX,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Body of a non-streaming `/api/chat` request.
#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    pub options: ChatOptions,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message], options: ChatOptions) -> Self {
        Self {
            model,
            messages,
            stream: false,
            options,
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    message: Option<RawResponseMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

/// Outcome of one successful chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    /// Assistant reply text.
    pub content: String,
    /// Wall-clock time from sending the request to reading the full body.
    pub duration: Duration,
    /// Tokens the server evaluated for the prompt (`prompt_eval_count`).
    pub prompt_tokens: u32,
    /// Tokens the server generated (`eval_count`).
    pub generated_tokens: u32,
}

impl ChatResult {
    /// Tokens processed by this call: prompt plus generated.
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens as u64 + self.generated_tokens as u64
    }
}

/// Parse an `/api/chat` response body. Missing counters default to 0.
pub(crate) fn parse_chat_response(text: &str, duration: Duration) -> Result<ChatResult, ChatError> {
    let parsed: RawChatResponse = serde_json::from_str(text)
        .map_err(|e| ChatError::MalformedResponse(format!("failed to parse response: {e}")))?;

    if let Some(err) = parsed.error {
        return Err(ChatError::Api(err));
    }

    let content = parsed
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| ChatError::MalformedResponse("missing message.content".to_string()))?;

    Ok(ChatResult {
        content,
        duration,
        prompt_tokens: parsed.prompt_eval_count.unwrap_or(0),
        generated_tokens: parsed.eval_count.unwrap_or(0),
    })
}

// ── Backend seam ───────────────────────────────────────────────────

/// Boxed future returned by [`ChatBackend::chat`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatResult, ChatError>> + Send + 'a>>;

/// Anything that can answer a chat request.
///
/// Workflows talk to the model only through this trait. [`OllamaClient`] is
/// the real implementation; tests script responses with a stub.
pub trait ChatBackend: Send + Sync {
    fn chat<'a>(&'a self, model: &'a str, messages: &'a [Message]) -> ChatFuture<'a>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for Ollama's `/api/chat` endpoint.
pub struct OllamaClient {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoint: String,
    pub(crate) options: ChatOptions,
}

impl OllamaClient {
    /// Create a client for the given endpoint with default options and no
    /// request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ChatError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create a client with an optional overall request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder().user_agent("prune-bench/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            options: ChatOptions::default(),
        })
    }

    /// Create a client from a [`BenchConfig`](config::BenchConfig): endpoint,
    /// timeout, and sampling options.
    pub fn from_config(config: &config::BenchConfig) -> Result<Self, ChatError> {
        Ok(Self::with_timeout(&config.endpoint, config.timeout)?.with_options(config.chat_options()))
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> ChatOptions {
        self.options
    }

    /// Send one non-streaming chat request and time it.
    pub async fn chat(&self, model: &str, messages: &[Message]) -> Result<ChatResult, ChatError> {
        let body = ChatRequest::new(model, messages, self.options);
        debug!(
            "LLM request: model={}, messages={}, num_ctx={}, temp={}",
            model,
            messages.len(),
            body.options.num_ctx,
            body.options.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Network(format!("request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ChatError::Network(format!("failed to read response: {e}")))?;

        let elapsed = start.elapsed();
        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            elapsed.as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(ChatError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let result = parse_chat_response(&text, elapsed)?;
        debug!(
            "Token usage: prompt={}, generated={}",
            result.prompt_tokens, result.generated_tokens
        );
        Ok(result)
    }
}

impl ChatBackend for OllamaClient {
    fn chat<'a>(&'a self, model: &'a str, messages: &'a [Message]) -> ChatFuture<'a> {
        Box::pin(OllamaClient::chat(self, model, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "hello");

        assert_eq!(Message::user("world").role, MessageRole::User);
        assert_eq!(Message::assistant("plan").role, MessageRole::Assistant);
    }

    #[test]
    fn chat_request_serializes_ollama_shape() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let req = ChatRequest::new("llama3.2", &messages, ChatOptions::default());
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["options"]["num_ctx"], 4096);
        let temp = json["options"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
    }

    #[test]
    fn parse_extracts_content_and_counters() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"ok"},
            "done":true,"prompt_eval_count":57,"eval_count":12}"#;
        let result = parse_chat_response(body, Duration::from_millis(1500)).unwrap();
        assert_eq!(result.content, "ok");
        assert_eq!(result.prompt_tokens, 57);
        assert_eq!(result.generated_tokens, 12);
        assert_eq!(result.total_tokens(), 69);
        assert_eq!(result.duration, Duration::from_millis(1500));
    }

    #[test]
    fn parse_defaults_missing_counters_to_zero() {
        let body = r#"{"message":{"role":"assistant","content":"ok"},"eval_count":null}"#;
        let result = parse_chat_response(body, Duration::ZERO).unwrap();
        assert_eq!(result.prompt_tokens, 0);
        assert_eq!(result.generated_tokens, 0);
    }

    #[test]
    fn parse_rejects_missing_content() {
        let err = parse_chat_response(r#"{"done":true}"#, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn parse_surfaces_server_error_field() {
        let err = parse_chat_response(r#"{"error":"model not found"}"#, Duration::ZERO).unwrap_err();
        assert_eq!(err, ChatError::Api("model not found".into()));
    }

    #[test]
    fn parse_rejects_non_json() {
        let err = parse_chat_response("<html>", Duration::ZERO).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }
}
