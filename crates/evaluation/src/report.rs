//! Plain-text rendering of evaluation results

use rageval_core::{BatchResult, EvaluationResult};
use std::fmt::{self, Write};

/// Render a single evaluation result as a human-readable report
pub fn render_report(result: &EvaluationResult) -> String {
    let mut out = String::new();
    // Writing into a String never fails
    write_report(&mut out, result).map(|_| out).unwrap_or_default()
}

/// Render batch averages followed by one line per evaluated case
pub fn render_batch_summary(batch: &BatchResult) -> String {
    let mut out = String::new();
    write_batch_summary(&mut out, batch)
        .map(|_| out)
        .unwrap_or_default()
}

fn write_report(out: &mut impl Write, result: &EvaluationResult) -> fmt::Result {
    writeln!(out, "Query: {}", result.query)?;
    writeln!(out)?;
    writeln!(out, "Retrieved documents:          {}", result.retrieved_count)?;
    writeln!(out, "Ground truth documents:       {}", result.ground_truth_count)?;
    writeln!(
        out,
        "Relevant retrieved documents: {}",
        result.relevant_retrieved_count
    )?;
    writeln!(out, "Missed documents:             {}", result.missed_count)?;
    writeln!(out)?;
    writeln!(out, "Precision: {}", metric(result.precision))?;
    writeln!(out, "Recall:    {}", metric(result.recall))?;
    writeln!(out, "F1-score:  {}", metric(result.f1_score))?;

    write_doc_list(out, "Relevant retrieved:", &result.relevant_retrieved_docs)?;
    write_doc_list(out, "Missed:", &result.missed_docs)?;

    if let Some(ai) = &result.ai_rating {
        writeln!(out)?;
        writeln!(out, "AI rating: {}", ai.rating)?;
        writeln!(out, "Comment:   {}", ai.comment)?;
        for (doc, relevant) in &ai.relevance_labels {
            let mark = if *relevant { '✓' } else { '✗' };
            writeln!(out, "  {mark} {doc}")?;
        }
    }

    Ok(())
}

fn write_doc_list(out: &mut impl Write, heading: &str, docs: &[String]) -> fmt::Result {
    if docs.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{heading}")?;
    for doc in docs {
        writeln!(out, "  - {doc}")?;
    }
    Ok(())
}

fn write_batch_summary(out: &mut impl Write, batch: &BatchResult) -> fmt::Result {
    writeln!(
        out,
        "Evaluated {} of {} cases",
        batch.evaluated_cases, batch.total_cases
    )?;
    writeln!(out, "Average precision: {}", metric(batch.average_precision))?;
    writeln!(out, "Average recall:    {}", metric(batch.average_recall))?;
    writeln!(out, "Average F1-score:  {}", metric(batch.average_f1_score))?;
    writeln!(out)?;

    for result in &batch.detailed_results {
        let rating = result
            .ai_rating
            .as_ref()
            .map(|ai| format!(" [{}]", ai.rating))
            .unwrap_or_default();
        writeln!(
            out,
            "  p={:.4} r={:.4} f1={:.4}{rating}  {}",
            result.precision, result.recall, result.f1_score, result.query
        )?;
    }

    for rejected in &batch.rejected_cases {
        writeln!(out, "  rejected case {}: {}", rejected.index, rejected.reason)?;
    }

    Ok(())
}

fn metric(value: f64) -> String {
    format!("{value:.4} ({:.2}%)", value * 100.0)
}
