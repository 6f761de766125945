//! Single, batch and report evaluation over the metrics calculator and judge

use crate::metrics;
use futures::stream::{self, StreamExt};
use rageval_core::error::{Error, Result};
use rageval_core::{
    AiRating, BatchResult, EvaluationCase, EvaluationConfig, EvaluationResult, RejectedCase,
    RelevanceSource, ReportRequest,
};
use rageval_judge::RelevanceJudge;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinates metric computation and optional AI rating for evaluation cases
///
/// The orchestrator holds no mutable state. It can be shared across tasks
/// behind an `Arc` and called concurrently.
pub struct EvaluationOrchestrator {
    judge: Option<Arc<RelevanceJudge>>,
    max_concurrent_cases: usize,
    relevance_source: RelevanceSource,
}

impl EvaluationOrchestrator {
    /// Create an orchestrator without a relevance judge
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            judge: None,
            max_concurrent_cases: config.max_concurrent_cases.max(1),
            relevance_source: config.relevance_source,
        }
    }

    /// Attach the judge used for cases that request AI rating
    pub fn with_judge(mut self, judge: Arc<RelevanceJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn has_judge(&self) -> bool {
        self.judge.is_some()
    }

    /// Evaluate one case.
    ///
    /// Fails only for a blank query. Judge problems are logged and leave
    /// `ai_rating` unset on an otherwise complete result.
    pub async fn evaluate(&self, case: &EvaluationCase) -> Result<EvaluationResult> {
        case.validate()?;

        debug!(
            "Evaluating query '{}' ({} retrieved, {} ground truth, ai_rating={})",
            case.query,
            case.retrieved_docs.len(),
            case.ground_truth_docs.len(),
            case.use_ai_rating
        );

        let ai_rating = if case.use_ai_rating {
            self.rate(case).await
        } else {
            None
        };

        let metrics = match (&ai_rating, self.relevance_source) {
            (Some(rating), RelevanceSource::Judge) => metrics::calculate_with_labels(
                &case.retrieved_docs,
                &case.ground_truth_docs,
                &rating.relevance_labels,
            ),
            _ => metrics::calculate(&case.retrieved_docs, &case.ground_truth_docs),
        };

        debug!(
            "Query '{}': precision={:.4} recall={:.4} f1={:.4}",
            case.query, metrics.precision, metrics.recall, metrics.f1_score
        );

        Ok(metrics.into_result(case.query.clone(), ai_rating))
    }

    /// Evaluate a batch of cases, applying `use_ai_rating` to every case.
    ///
    /// Cases run with bounded concurrency and results come back in input
    /// order. A case with a blank query is recorded in `rejected_cases` and
    /// excluded from the averages. An empty batch, or one where every case is
    /// rejected, is invalid input.
    pub async fn batch_evaluate(
        &self,
        cases: Vec<EvaluationCase>,
        use_ai_rating: bool,
    ) -> Result<BatchResult> {
        if cases.is_empty() {
            return Err(Error::invalid_input(
                "Batch must contain at least one test case",
            ));
        }

        let total_cases = cases.len();
        info!(
            "Evaluating batch of {total_cases} cases (ai_rating={use_ai_rating}, concurrency={})",
            self.max_concurrent_cases
        );

        let outcomes: Vec<Result<EvaluationResult>> = stream::iter(cases)
            .map(|mut case| async move {
                case.use_ai_rating = use_ai_rating;
                self.evaluate(&case).await
            })
            .buffered(self.max_concurrent_cases)
            .collect()
            .await;

        let mut detailed_results = Vec::with_capacity(total_cases);
        let mut rejected_cases = Vec::new();

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => detailed_results.push(result),
                Err(e) if e.is_invalid_input() => {
                    warn!("Skipping batch case {index}: {e}");
                    rejected_cases.push(RejectedCase {
                        index,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if detailed_results.is_empty() {
            return Err(Error::invalid_input(format!(
                "None of the {total_cases} test cases could be evaluated"
            )));
        }

        let average_precision = mean(detailed_results.iter().map(|r| r.precision));
        let average_recall = mean(detailed_results.iter().map(|r| r.recall));
        let average_f1_score = mean(detailed_results.iter().map(|r| r.f1_score));

        info!(
            "Batch complete: {}/{total_cases} evaluated, avg precision={average_precision:.4} recall={average_recall:.4} f1={average_f1_score:.4}",
            detailed_results.len()
        );

        Ok(BatchResult {
            total_cases,
            evaluated_cases: detailed_results.len(),
            average_precision,
            average_recall,
            average_f1_score,
            detailed_results,
            rejected_cases,
        })
    }

    /// Build a report for one query; same result as [`Self::evaluate`]
    pub async fn build_report(
        &self,
        query: impl Into<String>,
        retrieved_docs: Vec<String>,
        ground_truth_docs: Vec<String>,
        use_ai_rating: bool,
    ) -> Result<EvaluationResult> {
        let case = EvaluationCase::new(query, retrieved_docs, ground_truth_docs, use_ai_rating);
        self.evaluate(&case).await
    }

    /// Build a report from the flattened query-parameter form
    pub async fn build_report_from_request(
        &self,
        request: ReportRequest,
    ) -> Result<EvaluationResult> {
        self.evaluate(&EvaluationCase::from(request)).await
    }

    async fn rate(&self, case: &EvaluationCase) -> Option<AiRating> {
        let Some(judge) = &self.judge else {
            warn!(
                "AI rating requested for query '{}' but no relevance judge is configured",
                case.query
            );
            return None;
        };

        match judge
            .judge(&case.query, &case.retrieved_docs, &case.ground_truth_docs)
            .await
        {
            Ok(rating) => {
                debug!("Judge rated query '{}' as {}", case.query, rating.rating);
                Some(rating)
            }
            Err(e) => {
                warn!(
                    "Relevance judge unavailable for query '{}': {e}",
                    case.query
                );
                None
            }
        }
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
