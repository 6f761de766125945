//! Error types for the relevance judge
//!
//! Every variant is an "unavailable" signal: the orchestrator logs it and
//! carries on without an AI rating.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while obtaining a judge verdict
#[derive(Error, Debug)]
pub enum JudgeError {
    /// The backend did not answer within the configured bound
    #[error("Judge timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Transport failure or non-success status from the backend
    #[error("Judge backend failed: {0}")]
    Backend(String),

    /// The backend answered, but not with a usable verdict
    #[error("Malformed judge response: {0}")]
    MalformedResponse(String),

    /// Backend could not be constructed
    #[error("Judge configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JudgeError>;

impl From<JudgeError> for rageval_core::Error {
    fn from(err: JudgeError) -> Self {
        match err {
            JudgeError::Config(msg) => rageval_core::Error::config(msg),
            other => rageval_core::Error::judge(other.to_string()),
        }
    }
}

/// Shorten backend payloads before they end up in log lines and errors
pub(crate) fn truncate_for_error(text: &str) -> String {
    const MAX_ERROR_CHARS: usize = 200;
    if text.chars().count() <= MAX_ERROR_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_ERROR_CHARS).collect();
        format!("{head}...")
    }
}
