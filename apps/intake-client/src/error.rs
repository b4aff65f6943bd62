//! # Error Types
//!
//! Errors surfaced by the client layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  Validation Error? ── ValidationError ───────┐                          │
//! │                                              │                          │
//! │  Cart rule?  ──────── CoreError::LimitExceeded / OutOfStock ──┐         │
//! │                                              │                │         │
//! │  API failure? ─────── ApiFailure { status, body }             │         │
//! │                         │ message extracted from body         │         │
//! │                         ▼                                     ▼         │
//! │                      ApiError { code, message } ───────► toast / inline │
//! │                                                                         │
//! │  Every failure is terminal for the action that raised it. Nothing is   │
//! │  retried and the stores keep their previous state.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use intake_core::{CoreError, ValidationError};
use serde::Serialize;
use serde_json::Value;

use crate::api::ApiFailure;

/// Toast text used when the response body carries nothing readable.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error returned to the UI from any client operation.
///
/// ## Serialization
/// ```json
/// { "code": "OUT_OF_STOCK", "message": "2.5mg is out of stock (available: 1)" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for client operations.
///
/// `LimitExceeded` and `OutOfStock` stay separate so the UI can show
/// different toasts for "maximum per order" and "no more stock".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed, shown inline
    ValidationError,

    /// Per-order quantity cap reached
    LimitExceeded,

    /// Not enough stock for another unit
    OutOfStock,

    /// Cart line or resource not found
    NotFound,

    /// Coupon rejected or malformed
    InvalidCoupon,

    /// Checkout with an empty basket
    EmptyCart,

    /// Session expired or credentials refused (401/403)
    Unauthorized,

    /// The API answered with an error status
    ServerError,

    /// The request never completed (timeout, connectivity)
    Network,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Network, message)
    }

    /// Builds the error for a failed API response.
    ///
    /// The message comes from the body when one can be found, otherwise
    /// [`GENERIC_MESSAGE`] is used.
    pub fn from_failure(failure: &ApiFailure) -> Self {
        let code = match failure.status {
            0 => ErrorCode::Network,
            400 | 422 => ErrorCode::ValidationError,
            401 | 403 => ErrorCode::Unauthorized,
            404 => ErrorCode::NotFound,
            _ => ErrorCode::ServerError,
        };

        let message = extract_message(&failure.body).unwrap_or_else(|| {
            tracing::warn!(status = failure.status, "API error body had no message");
            GENERIC_MESSAGE.to_string()
        });

        ApiError { code, message }
    }
}

/// Pulls a readable message out of an error body.
///
/// Looks, in order, at `message`, `error` (string or `{ message }`),
/// `errors` as an array (first string) and `errors` as a field map (first
/// message of the first field). Plain-text bodies are used as-is when short.
pub fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            let looks_like_text = body.len() <= 200 && !body.starts_with('<');
            return looks_like_text.then(|| body.to_string());
        }
    };

    let candidates = [
        value.get("message"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("errors").and_then(first_error),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    found
}

fn first_error(errors: &Value) -> Option<&Value> {
    match errors {
        Value::Array(items) => items.first(),
        Value::Object(fields) => fields.values().next().and_then(|v| match v {
            Value::Array(items) => items.first(),
            other => Some(other),
        }),
        _ => None,
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::LineNotFound { .. } => ErrorCode::NotFound,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InvalidCoupon { .. } => ErrorCode::InvalidCoupon,
            CoreError::Validation(e) => return ApiError::from(e.clone()),
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Client Error
// =============================================================================

/// Failures of the local plumbing: configuration and session snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No {0} path available on this platform")]
    NoPath(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    CorruptSnapshot(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
