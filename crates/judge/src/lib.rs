//! AI relevance judge for retrieval evaluation
//!
//! This crate labels retrieved documents as relevant or irrelevant by semantic
//! judgment, using an LLM behind a text-in/text-out [`JudgeBackend`], and
//! produces an overall rating with a comment.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use async_trait::async_trait;
use rageval_core::config::JudgeConfig;
use rageval_core::error::{Error, Result as CoreResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod error;
mod judge;
mod openai;
mod parse;
mod prompts;
mod static_backend;

pub use error::{JudgeError, Result};
pub use judge::RelevanceJudge;
pub use openai::OpenAiCompatibleBackend;
pub use static_backend::StaticJudgeBackend;

/// Trait for judge backends
///
/// A backend is an opaque text-reasoning service: it receives the full judge
/// prompt and returns the model's raw reply. Backends must be treated as
/// unreliable; the [`RelevanceJudge`] bounds every call with a timeout and
/// validates the reply.
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    /// Send one prompt and return the raw reply text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Create a new judge backend based on configuration
///
/// # Arguments
/// * `config` - Judge configuration including provider type
pub async fn create_judge_backend(config: &JudgeConfig) -> CoreResult<Arc<dyn JudgeBackend>> {
    match config.provider.as_str() {
        "openai" => {
            info!("Creating OpenAI-compatible judge backend");
            let backend = OpenAiCompatibleBackend::new(
                config.model.clone(),
                config.api_base_url.clone(),
                config.resolve_api_key(),
                config.timeout_secs,
            )?
            .with_temperature(config.temperature);

            // Never fails creation, but waits up to timeout_secs on a silent endpoint
            backend.check_health().await;

            Ok(Arc::new(backend))
        }
        "static" => {
            let response = config.static_response.clone().ok_or_else(|| {
                Error::config("judge.static_response is required for the static provider")
            })?;

            info!("Creating static judge backend");
            Ok(Arc::new(StaticJudgeBackend::new(response)))
        }
        other => Err(Error::config(format!(
            "Unknown judge provider: '{other}'. Valid providers: openai, static"
        ))),
    }
}

/// Create a relevance judge from configuration
pub async fn create_relevance_judge(config: &JudgeConfig) -> CoreResult<RelevanceJudge> {
    let backend = create_judge_backend(config).await?;
    Ok(
        RelevanceJudge::new(backend, Duration::from_secs(config.timeout_secs))
            .with_max_document_chars(config.max_document_chars)
            .with_max_concurrent_requests(config.max_concurrent_requests),
    )
}
