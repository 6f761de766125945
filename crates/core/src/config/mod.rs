//! Configuration module for the rageval system
//!
//! This module provides configuration structures and loading mechanisms for the
//! relevance judge and the evaluation orchestrator. Configuration can be loaded
//! from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.rageval/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".rageval").join("config.toml"))
}

/// Main configuration structure for the rageval system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relevance judge configuration
    #[serde(default)]
    pub judge: JudgeConfig,

    /// Evaluation orchestrator configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Configuration for the AI relevance judge
///
/// # Providers
/// - `openai` (default): any OpenAI-compatible chat completions endpoint (vLLM, Ollama, hosted APIs)
/// - `static`: replies with `static_response` verbatim, for dry runs and tests
#[derive(Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Provider type: "openai" (default), "static"
    #[serde(default = "default_judge_provider")]
    pub provider: String,

    /// Chat model used for judging
    #[serde(default = "default_judge_model")]
    pub model: String,

    /// API base URL, without the trailing `/chat/completions`
    #[serde(default = "default_judge_api_base_url")]
    pub api_base_url: String,

    /// API key for authentication (or use the LLM_API_KEY env var)
    pub api_key: Option<String>,

    /// Upper bound on a single judge call, in seconds (default: 30)
    #[serde(default = "default_judge_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent judge API requests (default: 4)
    #[serde(default = "default_judge_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Sampling temperature sent with each request (default: 0.0)
    #[serde(default = "default_judge_temperature")]
    pub temperature: f64,

    /// Documents longer than this are truncated in the judge prompt
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,

    /// Fixed reply returned by the `static` provider
    #[serde(default)]
    pub static_response: Option<String>,
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("temperature", &self.temperature)
            .field("max_document_chars", &self.max_document_chars)
            .field("static_response", &self.static_response)
            .finish()
    }
}

impl JudgeConfig {
    /// API key from config, falling back to the LLM_API_KEY env var
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("LLM_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}

/// Where relevant-retrieved membership comes from when AI rating is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceSource {
    /// Exact text match against ground truth; judge labels stay advisory
    #[default]
    ExactMatch,
    /// Judge labels decide which retrieved documents count as relevant
    Judge,
}

/// Configuration for the evaluation orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Maximum batch cases evaluated concurrently (default: 8)
    #[serde(default = "default_max_concurrent_cases")]
    pub max_concurrent_cases: usize,

    /// Source of relevance when AI rating is active (default: exact_match)
    #[serde(default)]
    pub relevance_source: RelevanceSource,
}

// Default implementations

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: default_judge_provider(),
            model: default_judge_model(),
            api_base_url: default_judge_api_base_url(),
            api_key: None,
            timeout_secs: default_judge_timeout_secs(),
            max_concurrent_requests: default_judge_max_concurrent_requests(),
            temperature: default_judge_temperature(),
            max_document_chars: default_max_document_chars(),
            static_response: None,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_cases: default_max_concurrent_cases(),
            relevance_source: RelevanceSource::default(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate judge configuration
        if !VALID_JUDGE_PROVIDERS.contains(&self.judge.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid judge provider '{}'. Must be one of: {:?}",
                self.judge.provider, VALID_JUDGE_PROVIDERS
            )));
        }

        if self.judge.provider == "static" && self.judge.static_response.is_none() {
            return Err(Error::config(
                "judge.static_response is required for the static provider".to_string(),
            ));
        }

        if self.judge.model.trim().is_empty() {
            return Err(Error::config("judge.model cannot be empty".to_string()));
        }

        if self.judge.timeout_secs == 0 {
            return Err(Error::config(
                "judge.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.judge.timeout_secs > 600 {
            return Err(Error::config(format!(
                "judge.timeout_secs too large (max 600, got {})",
                self.judge.timeout_secs
            )));
        }

        if self.judge.max_concurrent_requests == 0 {
            return Err(Error::config(
                "judge.max_concurrent_requests must be greater than 0".to_string(),
            ));
        }
        if self.judge.max_concurrent_requests > 256 {
            return Err(Error::config(format!(
                "judge.max_concurrent_requests too large (max 256, got {})",
                self.judge.max_concurrent_requests
            )));
        }

        if !(0.0..=2.0).contains(&self.judge.temperature) {
            return Err(Error::config(format!(
                "judge.temperature must be between 0.0 and 2.0 (got {})",
                self.judge.temperature
            )));
        }

        if self.judge.max_document_chars == 0 {
            return Err(Error::config(
                "judge.max_document_chars must be greater than 0".to_string(),
            ));
        }

        // Validate evaluation configuration
        if self.evaluation.max_concurrent_cases == 0 {
            return Err(Error::config(
                "evaluation.max_concurrent_cases must be greater than 0".to_string(),
            ));
        }
        if self.evaluation.max_concurrent_cases > 1024 {
            return Err(Error::config(format!(
                "evaluation.max_concurrent_cases too large (max 1024, got {})",
                self.evaluation.max_concurrent_cases
            )));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
