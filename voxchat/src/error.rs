//! Unified error types for the voxchat crates.
//!
//! This module provides the error hierarchy covering:
//! - Configuration loading errors (fatal at startup)
//! - Completion provider errors (fatal to the current turn)
//! - Speech synthesis errors (caught at the orchestrator boundary)

use std::time::Duration;

/// Result type alias for voxchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the voxchat library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Completion provider error.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Speech synthesis error.
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while loading [`Settings`](crate::config::Settings).
///
/// Configuration errors are fatal at startup: no client is constructed once
/// loading has failed.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("{name} environment variable not set")]
    MissingVar {
        /// Variable name.
        name: String,
    },

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// The offending value.
        value: String,
    },
}

impl ConfigError {
    /// Create a missing-variable error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingVar { name: name.into() }
    }

    /// Create an invalid-value error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Error type for chat completion operations.
///
/// Each variant represents a distinct failure mode, enabling callers to
/// pattern-match on specific cases. The orchestrator never catches these:
/// a broken model call is conversation-fatal.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum CompletionError {
    /// Authentication or authorization failure.
    #[error("[{provider}] {message}")]
    Auth {
        /// Provider name (e.g., "openai").
        provider: String,
        /// Error description.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("[{provider}] Rate limit exceeded. Please retry after some time.")]
    RateLimited {
        /// Provider name.
        provider: String,
    },

    /// Network or connection error.
    #[error("{0}")]
    Network(String),

    /// HTTP status error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response format error.
    #[error("Expected {expected}, got {got}")]
    ResponseFormat {
        /// Expected format description.
        expected: String,
        /// Actual format received.
        got: String,
    },

    /// Provider-specific error.
    #[error("[{provider}] {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Error description.
        message: String,
        /// Optional error code from the provider.
        code: Option<String>,
    },
}

impl CompletionError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ResponseFormat {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Check if this is a retryable error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for speech synthesis operations.
///
/// All variants are caught at the orchestrator boundary: a failed narration
/// is logged and skipped, never propagated into the conversation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SynthesisError {
    /// The synthesis service answered with a non-2xx status, or the request
    /// failed at the transport level. Carries the response body when there
    /// is one.
    #[error("synthesis API error{}: {body}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api {
        /// HTTP status code, absent on transport failures.
        status: Option<u16>,
        /// Response body or transport error description.
        body: String,
    },

    /// The service broke the response contract: neither inline audio nor a
    /// task id on submit, or a completed task with no audio at all.
    #[error("synthesis protocol error: {0}")]
    Protocol(String),

    /// The remote reported the task as failed; there is nothing to retry.
    #[error("synthesis task {task_id} failed: {payload}")]
    TaskFailed {
        /// Identifier of the failed task.
        task_id: String,
        /// The status payload as reported by the service.
        payload: String,
    },

    /// The poll deadline elapsed without a terminal status.
    #[error("timed out after {elapsed:?} waiting for synthesis task {task_id}")]
    Timeout {
        /// Identifier of the task that never finished.
        task_id: String,
        /// Wall-clock time spent since submission.
        elapsed: Duration,
    },

    /// Inline audio could not be base64-decoded.
    #[error("invalid audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Writing the audio artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// Create an API error from a status code and response body.
    #[must_use]
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Create a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a task-failed error.
    #[must_use]
    pub fn task_failed(task_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::TaskFailed {
            task_id: task_id.into(),
            payload: payload.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(task_id: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            task_id: task_id.into(),
            elapsed,
        }
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::missing("OPENAI_API_KEY");
        assert_eq!(err.to_string(), "OPENAI_API_KEY environment variable not set");

        let err = ConfigError::invalid("HEYGEN_POLL_INTERVAL", "fast");
        assert_eq!(err.to_string(), "invalid value for HEYGEN_POLL_INTERVAL: fast");
    }

    #[test]
    fn completion_error_retryable() {
        assert!(CompletionError::rate_limited("openai").is_retryable());
        assert!(CompletionError::network("reset").is_retryable());
        assert!(!CompletionError::http_status(500, "oops").is_retryable());
        assert!(!CompletionError::auth("openai", "bad key").is_retryable());
    }

    #[test]
    fn synthesis_api_error_display_includes_status() {
        let err = SynthesisError::api(502, "bad gateway");
        assert_eq!(err.to_string(), "synthesis API error (HTTP 502): bad gateway");

        let err = SynthesisError::Api {
            status: None,
            body: "connection refused".to_owned(),
        };
        assert_eq!(err.to_string(), "synthesis API error: connection refused");
    }

    #[test]
    fn task_failed_display_carries_payload() {
        let err = SynthesisError::task_failed("t1", r#"{"status":"failed"}"#);
        assert!(err.to_string().contains("t1"));
        assert!(err.to_string().contains(r#"{"status":"failed"}"#));
    }

    #[test]
    fn errors_convert_into_umbrella() {
        let err: Error = ConfigError::missing("OPENAI_API_KEY").into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = CompletionError::network("down").into();
        assert!(matches!(err, Error::Completion(_)));

        let err: Error = SynthesisError::protocol("missing audio").into();
        assert!(matches!(err, Error::Synthesis(_)));
    }
}
