//! Core types for the rageval retrieval evaluation system
//!
//! This crate provides the foundational pieces shared by the judge,
//! evaluation and CLI crates:
//!
//! - **Models**: evaluation cases, results, batch summaries and AI ratings
//! - **Configuration**: judge and evaluation settings
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use config::{Config, EvaluationConfig, JudgeConfig, RelevanceSource};
pub use error::{Error, Result, ResultExt};
pub use models::{
    AiRating, BatchResult, EvaluationCase, EvaluationResult, Rating, RejectedCase, ReportRequest,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::models::{EvaluationCase, EvaluationResult};
}
