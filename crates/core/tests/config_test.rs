use rageval_core::config::{Config, EvaluationConfig, JudgeConfig, RelevanceSource};

#[test]
fn test_judge_config_defaults() {
    let config = JudgeConfig::default();
    assert_eq!(config.provider, "openai");
    assert_eq!(config.model, "qwen2.5-7b-instruct");
    assert_eq!(config.api_base_url, "http://localhost:8000/v1");
    assert!(config.api_key.is_none());
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.max_concurrent_requests, 4);
    assert!(config.static_response.is_none());
}

#[test]
fn test_evaluation_config_defaults() {
    let config = EvaluationConfig::default();
    assert_eq!(config.max_concurrent_cases, 8);
    assert_eq!(config.relevance_source, RelevanceSource::ExactMatch);
}

#[test]
fn test_config_validation_judge_provider() {
    let mut config = Config::default();

    config.judge.provider = "openai".to_string();
    assert!(config.validate().is_ok());

    config.judge.provider = "static".to_string();
    config.judge.static_response = Some("{}".to_string());
    assert!(config.validate().is_ok());

    config.judge.provider = "invalid".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid judge provider"));
}

#[test]
fn test_config_validation_empty_model() {
    let mut config = Config::default();
    config.judge.model = "  ".to_string();
    assert!(config.validate().is_err());
}
