//! rageval CLI - retrieval evaluation for RAG systems
//!
//! This binary provides the command-line interface over the evaluation orchestrator.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rageval::{
    create_orchestrator, format_batch, format_result, load_batch, load_case, OutputFormat,
};
use rageval_core::config::Config;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rageval")]
#[command(about = "Retrieval quality evaluation for RAG systems")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single case read from a JSON file
    Evaluate {
        /// JSON file with query, retrieved_docs and ground_truth_docs
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Ask the relevance judge for an AI rating
        #[arg(long)]
        ai_rating: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Evaluate a batch of cases read from a JSON file
    Batch {
        /// JSON array of cases, or {"test_cases": [...], "use_ai_rating": bool}
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Ask the relevance judge for an AI rating on every case
        #[arg(long)]
        ai_rating: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Build a report for one query given on the command line
    Report {
        #[arg(short, long)]
        query: String,

        /// Retrieved document (repeatable)
        #[arg(short, long = "retrieved", value_name = "DOC")]
        retrieved: Vec<String>,

        /// Ground truth document (repeatable)
        #[arg(short, long = "ground-truth", value_name = "DOC")]
        ground_truth: Vec<String>,

        /// Ask the relevance judge for an AI rating
        #[arg(long)]
        ai_rating: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Evaluate {
            input,
            ai_rating,
            format,
        } => {
            let mut case = load_case(&input)?;
            case.use_ai_rating |= ai_rating;

            let orchestrator = create_orchestrator(&config, case.use_ai_rating).await?;
            let result = orchestrator.evaluate(&case).await?;
            format_result(&result, format)?
        }
        Commands::Batch {
            input,
            ai_rating,
            format,
        } => {
            let (cases, file_flag) = load_batch(&input)?.into_parts();
            let use_ai_rating = ai_rating || file_flag;
            info!("Loaded {} cases from {}", cases.len(), input.display());

            let orchestrator = create_orchestrator(&config, use_ai_rating).await?;
            let batch = orchestrator.batch_evaluate(cases, use_ai_rating).await?;
            format_batch(&batch, format)?
        }
        Commands::Report {
            query,
            retrieved,
            ground_truth,
            ai_rating,
            format,
        } => {
            let orchestrator = create_orchestrator(&config, ai_rating).await?;
            let result = orchestrator
                .build_report(query, retrieved, ground_truth, ai_rating)
                .await?;
            format_result(&result, format)?
        }
    };

    println!("{output}");
    Ok(())
}

/// Initialize logging system
///
/// Logs go to stderr so JSON on stdout stays machine-readable. `RUST_LOG`
/// takes precedence over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "rageval={level},rageval_core={level},rageval_judge={level},rageval_evaluation={level}"
        ))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    debug!("Loaded configuration: {config:?}");
    Ok(config)
}
