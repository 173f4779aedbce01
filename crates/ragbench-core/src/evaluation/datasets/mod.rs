//! Benchmark datasets for evaluation.
//!
//! - [`benchmark`] - question records with optional ground truth and
//!   recorded responses, loaded from JSON or JSONL
//! - [`recorded`] - a pipeline that replays recorded responses
//!
//! # EvalDataset Trait
//!
//! The [`EvalDataset`] trait is the common interface a benchmark exposes to
//! [`DatasetEvaluator`]: a name, the questions, and optional ground truth.
//!
//! # Example
//!
//! ```ignore
//! use ragbench_core::evaluation::datasets::{load_dataset, DatasetEvaluator, RecordedPipeline};
//!
//! let dataset = load_dataset(Path::new("data/bench.jsonl"))?;
//! let pipeline = RecordedPipeline::from_dataset(&dataset)?;
//! let mut evaluator = DatasetEvaluator::new(&dataset, pipeline, MetricSelection::all());
//! let result = evaluator.evaluate()?;
//! ```

pub mod benchmark;
pub mod recorded;

pub use benchmark::{load_dataset, BenchmarkDataset, BenchmarkRecord, DatasetError};
pub use recorded::{RecordedPipeline, UnrecordedQuestion};

use super::evaluator::{Evaluator, QuestionSetEvaluator};
use super::ground_truth::GroundTruth;
use super::runner::{Pipeline, RunProgress};
use super::scoring::{ConstantScorer, RelevanceScorer};
use super::table::EvaluateResult;
use crate::config::MetricSelection;
use crate::error::EvalError;

// ============================================================================
// EvalDataset Trait
// ============================================================================

/// Common interface for evaluation datasets.
pub trait EvalDataset {
    /// Dataset name for identification and reporting.
    fn name(&self) -> &str;

    /// Questions in evaluation order.
    fn questions(&self) -> Vec<String>;

    /// Ground truth aligned with [`EvalDataset::questions`], if the dataset
    /// has any.
    fn ground_truth(&self) -> Option<GroundTruth>;

    /// Number of questions.
    fn num_questions(&self) -> usize {
        self.questions().len()
    }
}

// ============================================================================
// Dataset Evaluator
// ============================================================================

/// Benchmark coupling a dataset to a pipeline.
pub struct DatasetEvaluator<P, R = ConstantScorer> {
    name: String,
    inner: QuestionSetEvaluator<P, R>,
}

impl<P: Pipeline> DatasetEvaluator<P> {
    /// Creates a benchmark evaluating `pipeline` on `dataset`.
    pub fn new<D: EvalDataset + ?Sized>(
        dataset: &D,
        pipeline: P,
        selection: MetricSelection,
    ) -> Self {
        let mut inner = QuestionSetEvaluator::new(pipeline, dataset.questions(), selection);
        if let Some(ground_truth) = dataset.ground_truth() {
            inner = inner.with_ground_truth(ground_truth);
        }
        Self {
            name: dataset.name().to_string(),
            inner,
        }
    }
}

impl<P: Pipeline, R: RelevanceScorer> DatasetEvaluator<P, R> {
    /// Replaces the relevance scorer.
    pub fn with_scorer<T: RelevanceScorer>(self, scorer: T) -> DatasetEvaluator<P, T> {
        DatasetEvaluator {
            name: self.name,
            inner: self.inner.with_scorer(scorer),
        }
    }

    /// Name of the evaluated dataset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of questions evaluated.
    pub fn num_questions(&self) -> usize {
        self.inner.questions().len()
    }
}

impl<P: Pipeline, R: RelevanceScorer> Evaluator for DatasetEvaluator<P, R> {
    fn evaluate_with_progress(
        &mut self,
        on_progress: &mut dyn FnMut(RunProgress),
    ) -> Result<EvaluateResult, EvalError> {
        self.inner.evaluate_with_progress(on_progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Passage, PassageId};

    fn recorded_dataset() -> BenchmarkDataset {
        BenchmarkDataset::new(
            "recorded",
            vec![
                BenchmarkRecord::new("Q1").with_ground_truth(["p1"]).with_response(
                    "A1",
                    vec![Passage::new("p1", "one"), Passage::new("p2", "two")],
                ),
                BenchmarkRecord::new("Q2").with_ground_truth(["p9"]).with_response(
                    "A2",
                    vec![Passage::new("p3", "three"), Passage::new("p4", "four")],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_evaluator_replays_recording() {
        let dataset = recorded_dataset();
        let pipeline = RecordedPipeline::from_dataset(&dataset).unwrap();
        let mut evaluator =
            DatasetEvaluator::new(&dataset, pipeline, MetricSelection::named(["Recall", "TopK"]));

        assert_eq!(evaluator.name(), "recorded");
        assert_eq!(evaluator.num_questions(), 2);

        let result = evaluator.evaluate().unwrap();
        assert_eq!(result.use_metrics, vec!["Recall", "TopK_Accuracy"]);
        assert_eq!(result.mean("Recall"), Some(0.5));
        assert_eq!(result.each_results.rows()[1].answer, "A2");
    }

    #[test]
    fn test_duplicate_questions_keep_their_own_responses() {
        let dataset = BenchmarkDataset::new(
            "duplicates",
            vec![
                BenchmarkRecord::new("Q")
                    .with_ground_truth(["p1"])
                    .with_response("A1", vec![Passage::new("p1", "one")]),
                BenchmarkRecord::new("Q")
                    .with_ground_truth(["p1"])
                    .with_response("A2", vec![Passage::new("p9", "nine")]),
            ],
        )
        .unwrap();
        let pipeline = RecordedPipeline::from_dataset(&dataset).unwrap();
        let mut evaluator =
            DatasetEvaluator::new(&dataset, pipeline, MetricSelection::named(["Recall"]));

        let result = evaluator.evaluate().unwrap();
        let rows = result.each_results.rows();
        assert_eq!(rows[0].answer, "A1");
        assert_eq!(rows[0].passages[0].id, PassageId::from("p1"));
        assert_eq!(rows[1].answer, "A2");
        assert_eq!(rows[1].passages[0].id, PassageId::from("p9"));
        assert_eq!(result.mean("Recall"), Some(0.5));

        // A second run replays the same recording
        let again = evaluator.evaluate().unwrap();
        assert_eq!(again.each_results.rows()[0].answer, "A1");
    }

    #[test]
    fn test_unrecorded_question_aborts() {
        let dataset = recorded_dataset();
        let mut evaluator =
            DatasetEvaluator::new(&dataset, RecordedPipeline::new(), MetricSelection::all());

        let result = evaluator.evaluate();
        assert!(matches!(result, Err(EvalError::Pipeline { index: 0, .. })));
    }
}
