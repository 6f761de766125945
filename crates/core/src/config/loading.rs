//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `RAGEVAL_` and use double underscores
    /// for nested values. For example:
    /// - `RAGEVAL_JUDGE__MODEL=qwen2.5-14b-instruct`
    /// - `RAGEVAL_EVALUATION__MAX_CONCURRENT_CASES=16`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Judge defaults
        let builder = set_config_default(builder, "judge.provider", default_judge_provider())?;
        let builder = set_config_default(builder, "judge.model", default_judge_model())?;
        let builder =
            set_config_default(builder, "judge.api_base_url", default_judge_api_base_url())?;
        let builder = set_config_default(
            builder,
            "judge.timeout_secs",
            default_judge_timeout_secs() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "judge.max_concurrent_requests",
            default_judge_max_concurrent_requests() as i64,
        )?;
        let builder =
            set_config_default(builder, "judge.temperature", default_judge_temperature())?;
        let builder = set_config_default(
            builder,
            "judge.max_document_chars",
            default_max_document_chars() as i64,
        )?;

        // Evaluation defaults
        let builder = set_config_default(
            builder,
            "evaluation.max_concurrent_cases",
            default_max_concurrent_cases() as i64,
        )?;
        let mut builder =
            set_config_default(builder, "evaluation.relevance_source", "exact_match")?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with RAGEVAL_ prefix
        builder = builder.add_source(
            Environment::with_prefix("RAGEVAL")
                .separator("__")
                .try_parsing(true),
        );

        // Support the LLM_* variables the RAG service already exports
        if let Ok(model) = std::env::var("LLM_MODEL") {
            builder = builder
                .set_override("judge.model", model)
                .map_err(|e| Error::config(format!("Failed to set LLM_MODEL: {e}")))?;
        }
        if let Ok(url) = std::env::var("LLM_API_BASE_URL") {
            builder = builder
                .set_override("judge.api_base_url", url)
                .map_err(|e| Error::config(format!("Failed to set LLM_API_BASE_URL: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.rageval/config.toml or custom --config path)
    /// 3. Environment variables (RAGEVAL_*, LLM_MODEL, LLM_API_BASE_URL)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
