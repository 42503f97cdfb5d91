//! Error types for model calls, report metrics, and configuration.

use thiserror::Error;

/// Why a single chat call produced no usable result.
///
/// Workflows exclude failed calls from their duration and token totals and
/// count them separately, so a failed workflow never looks cheaper than a
/// successful one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Transport failure: connection refused, timeout, or an unreadable body.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// The server answered 200 with an `{"error": ...}` payload.
    #[error("server error: {0}")]
    Api(String),
    /// The body was not JSON or lacked `message.content`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    /// Short tag for logs and progress lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Network(_) => "network",
            ChatError::HttpStatus { .. } => "http_status",
            ChatError::Api(_) => "api",
            ChatError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Comparison metric that cannot be computed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("baseline processed no tokens")]
    ZeroBaseline,
    /// Every trial had a failed or skipped call in at least one workflow.
    #[error("no trial completed both workflows")]
    IncompleteWorkflow,
}

/// Rejected [`BenchConfig`](crate::config::BenchConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("trials must be at least 1")]
    ZeroTrials,
    #[error("endpoint URL is empty")]
    EmptyEndpoint,
    #[error("{0} model name is empty")]
    EmptyModel(&'static str),
    #[error("task prompt is empty")]
    EmptyTask,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_error_display_includes_detail() {
        let err = ChatError::HttpStatus {
            status: 404,
            body: "model 'x' not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: model 'x' not found");
        assert_eq!(err.kind(), "http_status");
    }

    #[test]
    fn config_error_names_role() {
        assert_eq!(
            ConfigError::EmptyModel("worker").to_string(),
            "worker model name is empty"
        );
    }
}
