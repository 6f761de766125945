//! Fixed-reply judge backend for dry runs and testing

use crate::error::{JudgeError, Result};
use crate::JudgeBackend;
use async_trait::async_trait;

/// Judge backend that answers every prompt with the same reply
pub struct StaticJudgeBackend {
    reply: std::result::Result<String, String>,
}

impl StaticJudgeBackend {
    /// Create a backend that always returns `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            reply: Ok(response.into()),
        }
    }

    /// Create a backend whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

#[async_trait]
impl JudgeBackend for StaticJudgeBackend {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        match &self.reply {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(JudgeError::Backend(message.clone())),
        }
    }
}
