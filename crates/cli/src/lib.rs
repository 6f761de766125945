//! Library interface for the rageval CLI
//!
//! Input loading, output formatting and orchestrator construction live here so
//! integration tests can exercise them without spawning the binary.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rageval_core::{BatchResult, Config, EvaluationCase, EvaluationResult};
use rageval_evaluation::{render_batch_summary, render_report, EvaluationOrchestrator};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Human-readable report
    Text,
}

/// Batch input file contents
///
/// Either a bare array of cases or an object wrapping them with a batch-wide
/// AI rating flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BatchInput {
    Cases(Vec<EvaluationCase>),
    Wrapped {
        test_cases: Vec<EvaluationCase>,
        #[serde(default)]
        use_ai_rating: bool,
    },
}

impl BatchInput {
    /// Split into the cases and the file-level AI rating flag
    pub fn into_parts(self) -> (Vec<EvaluationCase>, bool) {
        match self {
            Self::Cases(cases) => (cases, false),
            Self::Wrapped {
                test_cases,
                use_ai_rating,
            } => (test_cases, use_ai_rating),
        }
    }
}

/// Parse a single evaluation case from JSON text
pub fn parse_case(content: &str) -> Result<EvaluationCase> {
    serde_json::from_str(content).context("Failed to parse evaluation case")
}

/// Parse a batch of evaluation cases from JSON text
pub fn parse_batch(content: &str) -> Result<BatchInput> {
    serde_json::from_str(content).context(
        "Failed to parse batch input (expected an array of cases or {\"test_cases\": [...]})",
    )
}

/// Read a single evaluation case from a JSON file
pub fn load_case(path: &Path) -> Result<EvaluationCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_case(&content)
}

/// Read a batch of evaluation cases from a JSON file
pub fn load_batch(path: &Path) -> Result<BatchInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_batch(&content)
}

/// Build the orchestrator, constructing a judge backend only when AI rating is needed
pub async fn create_orchestrator(
    config: &Config,
    with_judge: bool,
) -> Result<EvaluationOrchestrator> {
    let orchestrator = EvaluationOrchestrator::new(&config.evaluation);
    if !with_judge {
        return Ok(orchestrator);
    }

    info!(
        "AI rating enabled, using {} judge with model {}",
        config.judge.provider, config.judge.model
    );
    let judge = rageval_judge::create_relevance_judge(&config.judge)
        .await
        .context("Failed to create relevance judge")?;
    Ok(orchestrator.with_judge(Arc::new(judge)))
}

/// Format a single evaluation result
pub fn format_result(result: &EvaluationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize result")
        }
        OutputFormat::Text => Ok(render_report(result)),
    }
}

/// Format a batch result
pub fn format_batch(batch: &BatchResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(batch).context("Failed to serialize batch result")
        }
        OutputFormat::Text => Ok(render_batch_summary(batch)),
    }
}
