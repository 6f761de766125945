//! Retrieval evaluation: metrics, orchestration and reporting
//!
//! This crate scores retrieval results against ground truth:
//!
//! - **metrics**: precision, recall and F1 by exact match or judge labels
//! - **orchestrator**: single, batch and report evaluation with optional AI rating
//! - **report**: plain-text rendering of results

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod metrics;
mod orchestrator;
pub mod report;

pub use metrics::Metrics;
pub use orchestrator::EvaluationOrchestrator;
pub use report::{render_batch_summary, render_report};
