use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Status,
    Parse,
    Pagination,
    NotFound,
    Timeout,
    Retryable,
    Internal,
}

/// Failure surfaced by any task. Status and parse failures keep the raw
/// response body so the caller can diagnose without re-running the call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            status: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Retryable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Configuration error: missing or conflicting inputs, detected before any request.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    /// Remote API answered with a status >= 400.
    pub fn status(operation: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let mut err = Self::new(
            ToolErrorKind::Status,
            "HTTP_STATUS",
            format!("Failed to {}: {} - {}", operation, status, body),
        )
        .with_details(serde_json::json!({ "status": status, "body": body }));
        err.status = Some(status);
        err
    }

    /// Response body did not match any recognized shape.
    pub fn parse(body: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ToolErrorKind::Parse,
            "PARSE_ERROR",
            format!("Failed to parse response ({}): {}", reason, body),
        )
        .with_details(serde_json::json!({ "body": body, "reason": reason.to_string() }))
    }

    pub fn pagination(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Pagination, "PAGINATION", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Retryable, "RETRYABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::internal(format!("JSON serialization failed: {}", err))
    }
}
