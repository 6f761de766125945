//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_JUDGE_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_JUDGE_MODEL: &str = "qwen2.5-7b-instruct";
pub(crate) const DEFAULT_JUDGE_API_BASE_URL: &str = "http://localhost:8000/v1";

/// Providers accepted by `judge.provider`
pub(crate) const VALID_JUDGE_PROVIDERS: [&str; 2] = ["openai", "static"];

pub(crate) fn default_judge_provider() -> String {
    DEFAULT_JUDGE_PROVIDER.to_string()
}

pub(crate) fn default_judge_model() -> String {
    DEFAULT_JUDGE_MODEL.to_string()
}

pub(crate) fn default_judge_api_base_url() -> String {
    DEFAULT_JUDGE_API_BASE_URL.to_string()
}

pub(crate) fn default_judge_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_judge_max_concurrent_requests() -> usize {
    4
}

pub(crate) fn default_judge_temperature() -> f64 {
    0.0
}

pub(crate) fn default_max_document_chars() -> usize {
    2_000 // keeps a 20-document prompt inside an 8k context
}

pub(crate) fn default_max_concurrent_cases() -> usize {
    8
}
