//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Classes
//!
//! - `CredentialMissing`: no usable API key resolved (prompt the user)
//! - `Api` with a 5xx status: transient server condition (retried)
//! - `Recovery`: model output could not be reduced to structured data
//! - `SafetyBlocked`: the provider declined on content-safety grounds
//!
//! Callers decide on recovery by matching variants, never by inspecting
//! error text.

use thiserror::Error;

// =============================================================================
// Recovery Error
// =============================================================================

/// Failure to reduce raw model text to a single structured value.
///
/// Retains both the original text and the cleaned slice that failed to
/// parse, for diagnostics.
#[derive(Debug, Clone)]
pub struct RecoveryError {
    /// What went wrong
    pub message: String,
    /// The raw model text as received
    pub original: String,
    /// The cleaned candidate slice, if cleanup got that far
    pub cleaned: Option<String>,
}

impl RecoveryError {
    pub fn new(message: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            original: original.into(),
            cleaned: None,
        }
    }

    /// Attach the cleaned slice that still failed to parse
    pub fn with_cleaned(mut self, cleaned: impl Into<String>) -> Self {
        self.cleaned = Some(cleaned.into());
        self
    }
}

impl std::fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.original.chars().take(120).collect();
        write!(f, "{} (response starts: {:?})", self.message, preview)
    }
}

impl std::error::Error for RecoveryError {}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum StudyError {
    // -------------------------------------------------------------------------
    // Credential Errors
    // -------------------------------------------------------------------------
    #[error("API key not provided. Set it with `studyweave key set` or the GEMINI_API_KEY env var")]
    CredentialMissing,

    // -------------------------------------------------------------------------
    // Model API Errors
    // -------------------------------------------------------------------------
    /// Non-success HTTP status from the model API. A 5xx status is a
    /// transient server condition and is retried by the executor.
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider declined to respond due to content-safety policy.
    /// Distinct from generic failure so the UI can say so.
    #[error("request blocked by the provider's safety filters: {0}")]
    SafetyBlocked(String),

    #[error("response recovery failed: {0}")]
    Recovery(#[from] RecoveryError),

    // -------------------------------------------------------------------------
    // Chat Errors
    // -------------------------------------------------------------------------
    #[error("a chat response is already in flight for this session")]
    ChatBusy,

    #[error("stream error: {0}")]
    Stream(String),

    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl StudyError {
    /// Create an API error from an HTTP status and response body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this failure is a transient server condition that the retry
    /// executor may attempt again. Only an internal-server-error class
    /// (HTTP 5xx) from the model API qualifies.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (500..=599).contains(status))
    }
}

pub type Result<T> = std::result::Result<T, StudyError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        assert!(StudyError::api(500, "internal").is_transient());
        assert!(StudyError::api(503, "overloaded").is_transient());
        assert!(!StudyError::api(400, "bad request").is_transient());
        assert!(!StudyError::api(429, "rate limited").is_transient());
        assert!(!StudyError::CredentialMissing.is_transient());
        assert!(!StudyError::ChatBusy.is_transient());
    }

    #[test]
    fn test_recovery_error_preview_is_bounded() {
        let err = RecoveryError::new("no JSON found", "x".repeat(5000));
        let rendered = err.to_string();
        assert!(rendered.len() < 300);
        assert!(rendered.contains("no JSON found"));
    }

    #[test]
    fn test_recovery_error_keeps_diagnostics() {
        let err = RecoveryError::new("parse failed", "raw text").with_cleaned("{broken");
        assert_eq!(err.original, "raw text");
        assert_eq!(err.cleaned.as_deref(), Some("{broken"));
    }
}
