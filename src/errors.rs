//! Shared error plumbing: grepable codes and the JSON error body.
//!
//! Every service error enum implements [`ErrorCode`] so that route handlers
//! and logs carry a stable, grepable code alongside the human-readable
//! message. Codes are `E_`-prefixed SCREAMING_SNAKE constants.

use serde::Serialize;

/// Grepable error code and retryable flag for structured error payloads.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// The JSON body routes return for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `E_PROJECT_NOT_FOUND`.
    pub code: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ErrorBody {
    /// Build the wire body from any [`ErrorCode`] error.
    #[must_use]
    pub fn from_error<E: ErrorCode>(error: &E) -> Self {
        Self { code: error.error_code(), message: error.to_string() }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod tests;
