//! OpenAI-compatible chat completions backend

use crate::error::{truncate_for_error, JudgeError, Result};
use crate::JudgeBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str =
    "You are a strict retrieval quality judge. Reply with a single JSON object and nothing else.";

/// Request payload for the chat completions API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Judge backend talking to any OpenAI-compatible endpoint (vLLM, Ollama, hosted APIs)
pub struct OpenAiCompatibleBackend {
    client: Client,
    model: String,
    api_base_url: String,
    api_key: Option<String>,
    temperature: f64,
}

impl OpenAiCompatibleBackend {
    /// Create a new OpenAI-compatible backend
    ///
    /// # Arguments
    /// * `model` - Model name (e.g., "qwen2.5-7b-instruct")
    /// * `api_base_url` - Base URL for the API (e.g., "http://localhost:8000/v1")
    /// * `api_key` - Optional bearer token
    /// * `timeout_secs` - Request timeout in seconds
    ///
    /// Concurrency is bounded by the [`crate::RelevanceJudge`] that owns the backend.
    pub fn new(
        model: String,
        api_base_url: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        info!("Initializing OpenAI-compatible judge backend");
        info!("  Model: {model}");
        info!("  API Base URL: {api_base_url}");
        info!("  Timeout: {timeout_secs}s");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| JudgeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: 0.0,
        })
    }

    /// Set the sampling temperature sent with each request
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check if the judge API is reachable
    ///
    /// Only warns on failure. Waits at most the client timeout.
    pub async fn check_health(&self) {
        debug!("Checking judge API health");

        let models_url = format!("{}/models", self.api_base_url);
        let mut request = self.client.get(&models_url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Judge API health check passed");
                } else {
                    warn!(
                        "Judge API health check failed with status: {}",
                        response.status()
                    );
                    warn!("  AI ratings will be omitted until the judge endpoint answers.");
                }
            }
            Err(e) => {
                warn!("Judge API health check failed: {e}");
                warn!("  AI ratings will be omitted until the judge endpoint answers.");
            }
        }
    }
}

#[async_trait]
impl JudgeBackend for OpenAiCompatibleBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.api_base_url);

        debug!("Sending judge request ({} prompt bytes)", prompt.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connection"
            } else if e.is_request() {
                "request build"
            } else if e.is_body() {
                "body"
            } else {
                "unknown"
            };
            JudgeError::Backend(format!("Judge API request failed ({error_kind}): {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(JudgeError::Backend(format!(
                "Judge API returned error {status}: {}",
                truncate_for_error(&error_text)
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            JudgeError::MalformedResponse(format!("Failed to parse chat completion: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                JudgeError::MalformedResponse("Chat completion had no content".to_string())
            })
    }
}
