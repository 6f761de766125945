//! Precision, recall and F1 over document sets
//!
//! Pure functions with no I/O. Every ratio whose denominator would be zero
//! is defined as `0.0`.

use rageval_core::{AiRating, EvaluationResult};
use std::collections::{BTreeMap, HashSet};

/// Scores for one retrieved/ground-truth pair
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Length of the retrieved sequence, duplicates included
    pub retrieved_count: usize,
    /// Number of distinct ground-truth documents
    pub ground_truth_count: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Relevant documents in retrieval order, each listed once
    pub relevant_retrieved_docs: Vec<String>,
    /// Ground-truth documents not retrieved, in the order they were supplied
    pub missed_docs: Vec<String>,
}

impl Metrics {
    pub fn relevant_retrieved_count(&self) -> usize {
        self.relevant_retrieved_docs.len()
    }

    pub fn missed_count(&self) -> usize {
        self.missed_docs.len()
    }

    /// Attach the query and optional judge verdict to produce the caller-facing result
    pub fn into_result(self, query: impl Into<String>, ai_rating: Option<AiRating>) -> EvaluationResult {
        EvaluationResult {
            query: query.into(),
            retrieved_count: self.retrieved_count,
            ground_truth_count: self.ground_truth_count,
            relevant_retrieved_count: self.relevant_retrieved_count(),
            missed_count: self.missed_count(),
            precision: self.precision,
            recall: self.recall,
            f1_score: self.f1_score,
            relevant_retrieved_docs: self.relevant_retrieved_docs,
            missed_docs: self.missed_docs,
            ai_rating,
        }
    }
}

/// Score `retrieved` against `ground_truth` by exact text equality.
pub fn calculate(retrieved: &[String], ground_truth: &[String]) -> Metrics {
    let truth = distinct(ground_truth);
    let truth_set: HashSet<&str> = truth.iter().copied().collect();

    let relevant: Vec<&str> = distinct(retrieved)
        .into_iter()
        .filter(|doc| truth_set.contains(doc))
        .collect();

    build(retrieved.len(), &truth, relevant)
}

/// Score `retrieved` using judge labels for relevant-retrieved membership.
///
/// A retrieved document counts as relevant when its label is `true`;
/// unlabelled documents count as irrelevant. Denominators are the same as for
/// [`calculate`]. The recall numerator is capped at the ground-truth size,
/// since the judge may accept more documents than the reference set lists.
pub fn calculate_with_labels(
    retrieved: &[String],
    ground_truth: &[String],
    labels: &BTreeMap<String, bool>,
) -> Metrics {
    let truth = distinct(ground_truth);

    let relevant: Vec<&str> = distinct(retrieved)
        .into_iter()
        .filter(|doc| labels.get(*doc).copied().unwrap_or(false))
        .collect();

    build(retrieved.len(), &truth, relevant)
}

fn build(retrieved_count: usize, truth: &[&str], relevant: Vec<&str>) -> Metrics {
    let relevant_set: HashSet<&str> = relevant.iter().copied().collect();

    let precision = ratio(relevant.len(), retrieved_count);
    // Judge labels can accept more documents than the reference set lists
    let recall = ratio(relevant.len().min(truth.len()), truth.len());
    let f1_score = f1(precision, recall);

    let missed_docs = truth
        .iter()
        .filter(|doc| !relevant_set.contains(*doc))
        .map(|doc| (*doc).to_string())
        .collect();

    Metrics {
        retrieved_count,
        ground_truth_count: truth.len(),
        precision,
        recall,
        f1_score,
        relevant_retrieved_docs: relevant.into_iter().map(str::to_string).collect(),
        missed_docs,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Harmonic mean of precision and recall
pub fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Distinct documents in first-occurrence order
fn distinct(docs: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    docs.iter()
        .map(String::as_str)
        .filter(|doc| seen.insert(*doc))
        .collect()
}
