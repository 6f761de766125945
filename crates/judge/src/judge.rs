//! Relevance judge: prompt, bounded backend call, verdict

use crate::error::{JudgeError, Result};
use crate::parse::parse_verdict;
use crate::prompts::{format_prompt, number_documents, RELEVANCE_JUDGE};
use crate::JudgeBackend;
use rageval_core::AiRating;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

const DEFAULT_MAX_DOCUMENT_CHARS: usize = 2_000;

/// Labels retrieved documents by semantic relevance and rates the retrieval
///
/// The judge never fails an evaluation: every problem with the backend
/// (timeout, transport, malformed reply) comes back as a `JudgeError`
/// for the caller to log and drop.
///
/// The timeout starts once a concurrency permit is held, so time spent
/// queuing behind other cases never counts against a call.
pub struct RelevanceJudge {
    backend: Arc<dyn JudgeBackend>,
    timeout: Duration,
    max_document_chars: usize,
    concurrency_limiter: Option<Arc<Semaphore>>,
}

impl RelevanceJudge {
    /// Create a judge over `backend`, bounding every call by `timeout`
    pub fn new(backend: Arc<dyn JudgeBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            concurrency_limiter: None,
        }
    }

    /// Truncate documents longer than `max_chars` in the prompt
    pub fn with_max_document_chars(mut self, max_chars: usize) -> Self {
        self.max_document_chars = max_chars.max(1);
        self
    }

    /// Allow at most `max_concurrent` backend calls in flight
    pub fn with_max_concurrent_requests(mut self, max_concurrent: usize) -> Self {
        self.concurrency_limiter = Some(Arc::new(Semaphore::new(max_concurrent.max(1))));
        self
    }

    /// Judge one evaluation case.
    ///
    /// Duplicate documents are judged once; the returned labels are keyed by
    /// document text and cover every distinct retrieved document.
    pub async fn judge(
        &self,
        query: &str,
        retrieved: &[String],
        ground_truth: &[String],
    ) -> Result<AiRating> {
        let retrieved = distinct(retrieved);
        let ground_truth = distinct(ground_truth);

        let prompt = self.build_prompt(query, &retrieved, &ground_truth);
        debug!(
            "Judging query '{}' with {} retrieved documents",
            query,
            retrieved.len()
        );

        let _permit = match &self.concurrency_limiter {
            Some(limiter) => Some(limiter.acquire().await.map_err(|e| {
                JudgeError::Backend(format!("Failed to acquire concurrency permit: {e}"))
            })?),
            None => None,
        };

        let response = tokio::time::timeout(self.timeout, self.backend.complete(&prompt))
            .await
            .map_err(|_| JudgeError::Timeout(self.timeout))??;

        let verdict = parse_verdict(&response, retrieved.len())?;

        let relevance_labels: BTreeMap<String, bool> = verdict
            .labels
            .iter()
            .filter_map(|(&position, &relevant)| {
                retrieved
                    .get(position)
                    .map(|doc| ((*doc).to_string(), relevant))
            })
            .collect();

        let relevant = relevance_labels.values().filter(|&&v| v).count();
        let irrelevant = relevance_labels.len() - relevant;
        let summary = format!(
            "{relevant} relevant, {irrelevant} irrelevant of {} retrieved documents.",
            relevance_labels.len()
        );
        let comment = if verdict.comment.is_empty() {
            summary
        } else {
            format!("{summary} {}", verdict.comment)
        };

        Ok(AiRating {
            relevance_labels,
            rating: verdict.rating,
            comment,
        })
    }

    fn build_prompt(&self, query: &str, retrieved: &[&str], ground_truth: &[&str]) -> String {
        let retrieved_count = retrieved.len().to_string();
        let ground_truth_count = ground_truth.len().to_string();
        let retrieved_docs = number_documents(retrieved, self.max_document_chars);
        let ground_truth_docs = number_documents(ground_truth, self.max_document_chars);

        format_prompt(
            RELEVANCE_JUDGE,
            &[
                ("query", query),
                ("retrieved_count", &retrieved_count),
                ("retrieved_docs", &retrieved_docs),
                ("ground_truth_count", &ground_truth_count),
                ("ground_truth_docs", &ground_truth_docs),
            ],
        )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticJudgeBackend;
    use async_trait::async_trait;
    use rageval_core::Rating;
    use std::sync::Mutex;

    /// Backend that records the prompt it was given
    struct RecordingBackend {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JudgeBackend for RecordingBackend {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .map_err(|e| JudgeError::Backend(e.to_string()))?
                .push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    /// Backend that never answers in time
    struct SlowBackend;

    #[async_trait]
    impl JudgeBackend for SlowBackend {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_judge_maps_labels_to_documents() {
        let backend = Arc::new(StaticJudgeBackend::new(
            r#"{"relevance_labels": {"1": true, "2": false}, "rating": "good", "comment": "Salt advice is on point."}"#,
        ));
        let judge = RelevanceJudge::new(backend, Duration::from_secs(5));

        let rating = judge
            .judge(
                "diet for hypertension",
                &docs(&["limit salt", "knee surgery", "limit salt"]),
                &docs(&["limit salt"]),
            )
            .await
            .unwrap();

        assert_eq!(rating.rating, Rating::Good);
        assert_eq!(rating.relevance_labels.len(), 2);
        assert_eq!(rating.relevance_labels.get("limit salt"), Some(&true));
        assert_eq!(rating.relevance_labels.get("knee surgery"), Some(&false));
        assert!(rating
            .comment
            .starts_with("1 relevant, 1 irrelevant of 2 retrieved documents."));
        assert!(rating.comment.ends_with("Salt advice is on point."));
    }

    #[tokio::test]
    async fn test_prompt_numbers_distinct_documents() {
        let backend = Arc::new(RecordingBackend {
            reply: r#"{"relevance_labels": {"1": true}, "rating": "excellent", "comment": ""}"#
                .to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let judge = RelevanceJudge::new(backend.clone(), Duration::from_secs(5));

        judge
            .judge("q", &docs(&["a", "a"]), &docs(&["a", "b", "b"]))
            .await
            .unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Retrieved documents (1):\n[1] a"));
        assert!(prompts[0].contains("relevant (2):\n[1] a\n[2] b"));
    }

    #[tokio::test]
    async fn test_empty_comment_keeps_summary() {
        let backend = Arc::new(StaticJudgeBackend::new(
            r#"{"relevance_labels": [true], "rating": "excellent", "comment": ""}"#,
        ));
        let judge = RelevanceJudge::new(backend, Duration::from_secs(5));
        let rating = judge.judge("q", &docs(&["a"]), &[]).await.unwrap();
        assert_eq!(
            rating.comment,
            "1 relevant, 0 irrelevant of 1 retrieved documents."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported() {
        let judge = RelevanceJudge::new(Arc::new(SlowBackend), Duration::from_secs(2));
        let err = judge.judge("q", &docs(&["a"]), &[]).await.unwrap_err();
        assert!(matches!(err, JudgeError::Timeout(d) if d == Duration::from_secs(2)));
    }

    /// Backend that takes a fixed time to answer
    struct PacedBackend {
        delay: Duration,
        reply: &'static str,
    }

    #[async_trait]
    impl JudgeBackend for PacedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_call_does_not_spend_its_timeout_waiting() {
        let backend = Arc::new(PacedBackend {
            delay: Duration::from_millis(1500),
            reply: r#"{"relevance_labels": [true], "rating": "good", "comment": "ok"}"#,
        });
        let judge = RelevanceJudge::new(backend, Duration::from_secs(2))
            .with_max_concurrent_requests(1);

        let first_docs = docs(&["a"]);
        let second_docs = docs(&["a"]);
        let (first, second) = tokio::join!(
            judge.judge("first", &first_docs, &[]),
            judge.judge("second", &second_docs, &[]),
        );

        assert_eq!(first.unwrap().rating, Rating::Good);
        assert_eq!(second.unwrap().rating, Rating::Good);
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let judge = RelevanceJudge::new(
            Arc::new(StaticJudgeBackend::failing("connection refused")),
            Duration::from_secs(5),
        );
        let err = judge.judge("q", &docs(&["a"]), &[]).await.unwrap_err();
        assert!(matches!(err, JudgeError::Backend(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported() {
        let judge = RelevanceJudge::new(
            Arc::new(StaticJudgeBackend::new("Looks great to me!")),
            Duration::from_secs(5),
        );
        let err = judge.judge("q", &docs(&["a"]), &[]).await.unwrap_err();
        assert!(matches!(err, JudgeError::MalformedResponse(_)));
    }
}
