//! Request and result models for retrieval evaluation
//!
//! These types form the contract between callers (CLI, HTTP layers) and the
//! evaluation core. They are request-scoped values: built once per evaluation
//! and handed back to the caller without further mutation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// One query together with what the system retrieved and what it should have retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCase {
    pub query: String,
    #[serde(default)]
    pub retrieved_docs: Vec<String>,
    /// Reference documents; duplicates collapse when scored
    #[serde(default)]
    pub ground_truth_docs: Vec<String>,
    #[serde(default)]
    pub use_ai_rating: bool,
}

impl EvaluationCase {
    pub fn new(
        query: impl Into<String>,
        retrieved_docs: Vec<String>,
        ground_truth_docs: Vec<String>,
        use_ai_rating: bool,
    ) -> Self {
        Self {
            query: query.into(),
            retrieved_docs,
            ground_truth_docs,
            use_ai_rating,
        }
    }

    /// Reject cases that cannot be scored.
    ///
    /// Empty document lists are valid; only a blank query is refused.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_input("Query cannot be empty"));
        }
        Ok(())
    }
}

/// Five-level verdict produced by the relevance judge, best first
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Rating {
    #[strum(to_string = "excellent", serialize = "优秀")]
    Excellent,
    #[strum(to_string = "good", serialize = "良好")]
    Good,
    #[strum(to_string = "fair", serialize = "中等")]
    Fair,
    #[strum(to_string = "poor", serialize = "较差")]
    Poor,
    #[strum(
        to_string = "very_poor",
        serialize = "very poor",
        serialize = "very-poor",
        serialize = "很差"
    )]
    VeryPoor,
}

/// Judge verdict attached to an evaluation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRating {
    /// Relevance label per distinct retrieved document
    pub relevance_labels: BTreeMap<String, bool>,
    pub rating: Rating,
    pub comment: String,
}

impl AiRating {
    /// Number of documents the judge labelled relevant
    pub fn relevant_count(&self) -> usize {
        self.relevance_labels.values().filter(|&&v| v).count()
    }

    /// Number of documents the judge labelled irrelevant
    pub fn irrelevant_count(&self) -> usize {
        self.relevance_labels.len() - self.relevant_count()
    }
}

/// Scored outcome of a single evaluation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub query: String,
    pub retrieved_count: usize,
    pub ground_truth_count: usize,
    pub relevant_retrieved_count: usize,
    pub missed_count: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub relevant_retrieved_docs: Vec<String>,
    pub missed_docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_rating: Option<AiRating>,
}

/// Batch case that was refused before scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCase {
    /// Position of the case in the submitted batch
    pub index: usize,
    pub reason: String,
}

/// Aggregate outcome of a batch evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Number of submitted cases
    pub total_cases: usize,
    /// Number of cases that were scored (equals `total_cases` unless some were rejected)
    pub evaluated_cases: usize,
    pub average_precision: f64,
    pub average_recall: f64,
    pub average_f1_score: f64,
    /// Per-case results in submission order
    pub detailed_results: Vec<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_cases: Vec<RejectedCase>,
}

/// Flattened report request as it arrives from query parameters
///
/// Array fields are spelled as repeated keys, e.g.
/// `query=q&retrieved_docs=a&retrieved_docs=b&ground_truth_docs=a`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub query: String,
    #[serde(default)]
    pub retrieved_docs: Vec<String>,
    #[serde(default)]
    pub ground_truth_docs: Vec<String>,
    #[serde(default)]
    pub use_ai_rating: bool,
}

impl ReportRequest {
    /// Rebuild a report request from already-decoded query parameter pairs.
    ///
    /// Keys may carry a trailing `[]`. Unknown keys are ignored. A missing
    /// `query` key or an unparseable `use_ai_rating` value is rejected.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = None;
        let mut request = Self::default();

        for (key, value) in pairs {
            let value: String = value.into();
            match key.as_ref().trim_end_matches("[]") {
                "query" => query = Some(value),
                "retrieved_docs" => request.retrieved_docs.push(value),
                "ground_truth_docs" => request.ground_truth_docs.push(value),
                "use_ai_rating" => request.use_ai_rating = parse_flag(&value)?,
                _ => {}
            }
        }

        request.query =
            query.ok_or_else(|| Error::invalid_input("Missing required parameter 'query'"))?;
        Ok(request)
    }
}

impl From<ReportRequest> for EvaluationCase {
    fn from(request: ReportRequest) -> Self {
        Self {
            query: request.query,
            retrieved_docs: request.retrieved_docs,
            ground_truth_docs: request.ground_truth_docs,
            use_ai_rating: request.use_ai_rating,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(Error::invalid_input(format!(
            "Invalid boolean for 'use_ai_rating': '{other}'"
        ))),
    }
}
