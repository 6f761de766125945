//! Integration tests for batch evaluation with stub judge backends

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rageval_core::{EvaluationCase, EvaluationConfig, Rating};
use rageval_evaluation::EvaluationOrchestrator;
use rageval_judge::{JudgeBackend, JudgeError, RelevanceJudge};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const GOOD_VERDICT: &str =
    r#"{"relevance_labels": {"1": true}, "rating": "good", "comment": "On topic."}"#;

/// Backend that fails for any prompt mentioning a marker query
struct FlakyBackend {
    fail_on: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl JudgeBackend for FlakyBackend {
    async fn complete(&self, prompt: &str) -> rageval_judge::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains(self.fail_on) {
            return Err(JudgeError::Backend("connection reset".to_string()));
        }
        Ok(GOOD_VERDICT.to_string())
    }
}

/// Backend whose latency shrinks with each call, so later cases finish first
struct StaggeredBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl JudgeBackend for StaggeredBackend {
    async fn complete(&self, _prompt: &str) -> rageval_judge::Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
        tokio::time::sleep(Duration::from_millis(50_u64.saturating_sub(call * 10))).await;
        Ok(GOOD_VERDICT.to_string())
    }
}

fn docs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn case(query: &str, retrieved: &[&str], ground_truth: &[&str]) -> EvaluationCase {
    EvaluationCase::new(query, docs(retrieved), docs(ground_truth), false)
}

fn with_backend(backend: Arc<dyn JudgeBackend>) -> EvaluationOrchestrator {
    let judge = RelevanceJudge::new(backend, Duration::from_secs(5));
    EvaluationOrchestrator::new(&EvaluationConfig::default()).with_judge(Arc::new(judge))
}

#[tokio::test]
async fn test_batch_averages_are_unweighted_means() {
    let orchestrator = EvaluationOrchestrator::new(&EvaluationConfig::default());
    let cases = vec![
        case("perfect", &["A"], &["A"]),
        case("half", &["A", "B"], &["A"]),
        case("none", &["C"], &["A"]),
    ];

    let batch = orchestrator.batch_evaluate(cases, false).await.unwrap();

    assert_eq!(batch.total_cases, 3);
    assert_eq!(batch.evaluated_cases, 3);
    assert!(batch.rejected_cases.is_empty());

    let precisions: Vec<f64> = batch.detailed_results.iter().map(|r| r.precision).collect();
    assert_eq!(precisions, vec![1.0, 0.5, 0.0]);
    assert!((batch.average_precision - 0.5).abs() < 1e-9);
    assert!((batch.average_recall - 2.0 / 3.0).abs() < 1e-9);

    let expected_f1 = batch.detailed_results.iter().map(|r| r.f1_score).sum::<f64>() / 3.0;
    assert!((batch.average_f1_score - expected_f1).abs() < 1e-9);
}

#[tokio::test]
async fn test_batch_rejects_empty_input() {
    let orchestrator = EvaluationOrchestrator::new(&EvaluationConfig::default());
    let err = orchestrator.batch_evaluate(vec![], false).await.unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn test_batch_records_invalid_cases_without_failing_siblings() {
    let orchestrator = EvaluationOrchestrator::new(&EvaluationConfig::default());
    let cases = vec![
        case("first", &["A"], &["A"]),
        case("   ", &["A"], &["A"]),
        case("third", &["B"], &["A"]),
    ];

    let batch = orchestrator.batch_evaluate(cases, false).await.unwrap();

    assert_eq!(batch.total_cases, 3);
    assert_eq!(batch.evaluated_cases, 2);
    assert_eq!(batch.rejected_cases.len(), 1);
    assert_eq!(batch.rejected_cases[0].index, 1);
    let queries: Vec<&str> = batch
        .detailed_results
        .iter()
        .map(|r| r.query.as_str())
        .collect();
    assert_eq!(queries, vec!["first", "third"]);
    assert!((batch.average_precision - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_batch_of_only_invalid_cases_is_invalid_input() {
    let orchestrator = EvaluationOrchestrator::new(&EvaluationConfig::default());
    let err = orchestrator
        .batch_evaluate(vec![case("", &[], &[]), case(" ", &["A"], &[])], false)
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn test_judge_failure_mid_batch_only_affects_that_case() {
    let backend = Arc::new(FlakyBackend {
        fail_on: "flaky query",
        calls: AtomicUsize::new(0),
    });
    let orchestrator = with_backend(backend.clone());
    let cases = vec![
        case("steady query one", &["A"], &["A"]),
        case("flaky query", &["A"], &["A", "B"]),
        case("steady query two", &["A"], &["B"]),
    ];

    let without_judge = EvaluationOrchestrator::new(&EvaluationConfig::default())
        .batch_evaluate(cases.clone(), false)
        .await
        .unwrap();
    let batch = orchestrator.batch_evaluate(cases, true).await.unwrap();

    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    assert!(batch.detailed_results[0].ai_rating.is_some());
    assert!(batch.detailed_results[1].ai_rating.is_none());
    assert!(batch.detailed_results[2].ai_rating.is_some());
    assert_eq!(
        batch.detailed_results[0].ai_rating.as_ref().map(|a| a.rating),
        Some(Rating::Good)
    );

    assert_eq!(batch.average_precision, without_judge.average_precision);
    assert_eq!(batch.average_recall, without_judge.average_recall);
    assert_eq!(batch.average_f1_score, without_judge.average_f1_score);
}

#[tokio::test(start_paused = true)]
async fn test_batch_preserves_input_order_under_concurrency() {
    let orchestrator = with_backend(Arc::new(StaggeredBackend {
        calls: AtomicUsize::new(0),
    }));
    let queries = ["q0", "q1", "q2", "q3", "q4"];
    let cases = queries.iter().map(|q| case(q, &["A"], &["A"])).collect();

    let batch = orchestrator.batch_evaluate(cases, true).await.unwrap();

    let returned: Vec<&str> = batch
        .detailed_results
        .iter()
        .map(|r| r.query.as_str())
        .collect();
    assert_eq!(returned, queries.to_vec());
    assert!(batch.detailed_results.iter().all(|r| r.ai_rating.is_some()));
}

#[tokio::test]
async fn test_batch_flag_overrides_case_flag() {
    let backend = Arc::new(FlakyBackend {
        fail_on: "never matches",
        calls: AtomicUsize::new(0),
    });
    let orchestrator = with_backend(backend.clone());
    let mut rated = case("q", &["A"], &["A"]);
    rated.use_ai_rating = true;

    let batch = orchestrator.batch_evaluate(vec![rated], false).await.unwrap();

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert!(batch.detailed_results[0].ai_rating.is_none());
}

#[tokio::test]
async fn test_batch_result_serializes_wire_shape() {
    let orchestrator = EvaluationOrchestrator::new(&EvaluationConfig::default());
    let batch = orchestrator
        .batch_evaluate(vec![case("q", &["A", "B"], &["A"])], false)
        .await
        .unwrap();

    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(json["total_cases"], 1);
    assert_eq!(json["average_precision"], 0.5);
    assert_eq!(json["detailed_results"][0]["relevant_retrieved_docs"][0], "A");
    assert!(json.get("rejected_cases").is_none());
    assert!(json["detailed_results"][0].get("ai_rating").is_none());
}
