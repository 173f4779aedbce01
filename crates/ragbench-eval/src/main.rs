//! ragbench Evaluation Tool
//!
//! Scores recorded RAG pipeline runs against their ground truth.
//!
//! # Dataset
//!
//! A `.json` or `.jsonl` file of question records, each carrying the
//! recorded pipeline response (`answer`, `retrieved`) and optionally the
//! relevant passages (`retrieval_gt`, `retrieval_gt_order`).
//!
//! # Usage
//!
//! ```bash
//! # Every metric the ground truth supports
//! cargo run -p ragbench-eval --release -- --dataset data/bench.jsonl
//!
//! # Selected metrics, JSON output
//! cargo run -p ragbench-eval --release -- --dataset data/bench.jsonl --metrics recall,ndcg --json
//!
//! # Show per-question breakdown
//! cargo run -p ragbench-eval --release -- --per-query
//! ```

mod config;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ragbench_core::config::EvaluatorConfig;
use ragbench_core::evaluation::datasets::{
    load_dataset, DatasetEvaluator, EvalDataset, RecordedPipeline,
};
use ragbench_core::evaluation::Evaluator;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "ragbench-eval")]
#[command(about = "Evaluate RAG retrieval quality on a recorded dataset")]
struct Args {
    /// Dataset file (.json or .jsonl); defaults to $RAGBENCH_DATASET
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Metrics to compute (comma-separated)
    #[arg(long, value_delimiter = ',')]
    metrics: Option<Vec<String>>,

    /// Compute every metric, ignoring --metrics
    #[arg(long)]
    all: bool,

    /// Skip unknown metric names instead of failing
    #[arg(long)]
    lenient: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Show per-question breakdown
    #[arg(long)]
    per_query: bool,

    /// Enable info-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Embedding provider (openai, kosimcse, ko-sroberta-multitask)
    #[arg(long)]
    embedding: Option<String>,

    /// Device for local embedding models (cpu, mps, cuda)
    #[arg(long, default_value = "cuda")]
    device: String,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Configuration errors surface before the dataset is touched
    let embedding = args
        .embedding
        .as_deref()
        .map(|provider| config::embedding_backend(provider, &args.device))
        .transpose()
        .context("Invalid embedding configuration")?;
    if let Some(backend) = &embedding {
        info!("Embedding backend: {}", backend);
    }

    let selection = EvaluatorConfig {
        run_all: args.all || args.metrics.is_none(),
        metrics: args.metrics.clone(),
        lenient: args.lenient,
    }
    .into_selection()?;

    let path = config::dataset_path(args.dataset.as_ref())?;
    let dataset = load_dataset(&path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    if !dataset.has_responses() {
        bail!(
            "Dataset '{}' has no recorded responses to evaluate",
            dataset.name()
        );
    }

    let pipeline = RecordedPipeline::from_dataset(&dataset)?;
    let mut evaluator = DatasetEvaluator::new(&dataset, pipeline, selection);

    let pb = ProgressBar::new(dataset.num_questions() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}")?);
    pb.set_message("Questions");

    let result = evaluator.evaluate_with_progress(&mut |progress| {
        pb.set_position(progress.completed as u64);
    });
    pb.finish_and_clear();
    let result = result.context("Evaluation failed")?;

    let report = output::EvalReport::new(
        dataset.name(),
        embedding.map(|backend| backend.to_string()),
        &result,
        args.per_query,
    );

    if args.json {
        println!("{}", output::format_json(&report));
    } else {
        println!("{}", output::format_human(&report));
    }

    Ok(())
}
