//! Evaluation entry points.
//!
//! A benchmark implements [`Evaluator`] by supplying its questions and ground
//! truth to the shared [`MetricEngine`]. The engine does the work in a fixed
//! order:
//!
//! 1. Check the batch and ground truth shapes
//! 2. Resolve the metric selection against the registry
//! 3. Run the pipeline over every question
//! 4. Build the result table and score each row
//! 5. Average every metric column
//!
//! Steps 1 and 2 finish before the pipeline is called, so configuration
//! mistakes never cost a pipeline run.

use super::ground_truth::GroundTruth;
use super::registry::{GroundTruthAvailability, MetricRegistry};
use super::runner::{run_pipeline, Pipeline, RunProgress};
use super::scoring::{ConstantScorer, RelevanceScorer};
use super::table::{EvaluateResult, ResultTable};
use crate::config::{EvaluatorConfig, MetricSelection};
use crate::error::EvalError;
use tracing::{info, instrument};

/// A benchmark that can be evaluated.
pub trait Evaluator {
    /// Runs the benchmark, reporting pipeline progress to `on_progress`.
    fn evaluate_with_progress(
        &mut self,
        on_progress: &mut dyn FnMut(RunProgress),
    ) -> Result<EvaluateResult, EvalError>;

    /// Runs the benchmark.
    fn evaluate(&mut self) -> Result<EvaluateResult, EvalError> {
        self.evaluate_with_progress(&mut |_| {})
    }
}

/// Shared metric computation: registry, selection and scorer.
#[derive(Debug, Clone)]
pub struct MetricEngine<R = ConstantScorer> {
    registry: MetricRegistry,
    selection: MetricSelection,
    scorer: R,
}

impl MetricEngine {
    /// Creates an engine with the built-in registry and the placeholder scorer.
    pub fn new(selection: MetricSelection) -> Self {
        Self {
            registry: MetricRegistry::new(),
            selection,
            scorer: ConstantScorer::default(),
        }
    }
}

impl<R: RelevanceScorer> MetricEngine<R> {
    /// Replaces the relevance scorer.
    pub fn with_scorer<T: RelevanceScorer>(self, scorer: T) -> MetricEngine<T> {
        MetricEngine {
            registry: self.registry,
            selection: self.selection,
            scorer,
        }
    }

    /// Replaces the metric registry.
    pub fn with_registry(mut self, registry: MetricRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The metric selection this engine computes.
    pub fn selection(&self) -> &MetricSelection {
        &self.selection
    }

    /// Evaluates `pipeline` over `questions`.
    ///
    /// `ground_truth`, when given, must cover every question. Without it
    /// only metrics that need no ground truth are computed.
    #[instrument(
        skip_all,
        fields(questions = questions.len(), ground_truth = ground_truth.is_some())
    )]
    pub fn calculate<P, S, F>(
        &self,
        questions: &[S],
        pipeline: P,
        ground_truth: Option<&GroundTruth>,
        on_progress: F,
    ) -> Result<EvaluateResult, EvalError>
    where
        P: Pipeline,
        S: AsRef<str>,
        F: FnMut(RunProgress),
    {
        if questions.is_empty() {
            return Err(EvalError::EmptyBatch);
        }
        if let Some(gt) = ground_truth {
            gt.validate(questions.len())?;
        }

        let availability = match ground_truth {
            None => GroundTruthAvailability::None,
            Some(gt) if gt.is_rank_aware() => GroundTruthAvailability::Ranked,
            Some(_) => GroundTruthAvailability::Unranked,
        };
        let metrics = self.registry.resolve(
            self.selection.metric_names(),
            availability,
            self.selection.mode(),
        )?;
        info!(
            "Evaluating {} questions with {} metrics",
            questions.len(),
            metrics.len()
        );

        let run = run_pipeline(questions, pipeline, on_progress)?;
        let mut table = ResultTable::from_run(questions, run, &self.scorer)?;
        table.add_metric_columns(&metrics, ground_truth)?;

        let result = EvaluateResult::from_table(table);
        info!("Computed {} metric means", result.results.len());
        Ok(result)
    }
}

/// Evaluates `pipeline` over `questions` with the default registry and scorer.
pub fn calculate_metrics<P, S>(
    selection: &MetricSelection,
    questions: &[S],
    pipeline: P,
    ground_truth: Option<&GroundTruth>,
) -> Result<EvaluateResult, EvalError>
where
    P: Pipeline,
    S: AsRef<str>,
{
    MetricEngine::new(selection.clone()).calculate(questions, pipeline, ground_truth, |_| {})
}

/// Benchmark over an in-memory question list.
pub struct QuestionSetEvaluator<P, R = ConstantScorer> {
    pipeline: P,
    questions: Vec<String>,
    ground_truth: Option<GroundTruth>,
    engine: MetricEngine<R>,
}

impl<P: Pipeline> QuestionSetEvaluator<P> {
    /// Creates a benchmark computing `selection`.
    pub fn new(pipeline: P, questions: Vec<String>, selection: MetricSelection) -> Self {
        Self {
            pipeline,
            questions,
            ground_truth: None,
            engine: MetricEngine::new(selection),
        }
    }

    /// Creates a benchmark from user-facing settings.
    ///
    /// Fails when `run_all` is false and no metrics are listed.
    pub fn from_config(
        pipeline: P,
        questions: Vec<String>,
        config: EvaluatorConfig,
    ) -> Result<Self, EvalError> {
        Ok(Self::new(pipeline, questions, config.into_selection()?))
    }
}

impl<P: Pipeline, R: RelevanceScorer> QuestionSetEvaluator<P, R> {
    /// Attaches ground truth, one entry per question.
    pub fn with_ground_truth(mut self, ground_truth: GroundTruth) -> Self {
        self.ground_truth = Some(ground_truth);
        self
    }

    /// Replaces the relevance scorer.
    pub fn with_scorer<T: RelevanceScorer>(self, scorer: T) -> QuestionSetEvaluator<P, T> {
        QuestionSetEvaluator {
            pipeline: self.pipeline,
            questions: self.questions,
            ground_truth: self.ground_truth,
            engine: self.engine.with_scorer(scorer),
        }
    }

    /// Replaces the metric registry.
    pub fn with_registry(mut self, registry: MetricRegistry) -> Self {
        self.engine = self.engine.with_registry(registry);
        self
    }

    /// Questions in evaluation order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Consumes the benchmark, returning its pipeline.
    pub fn into_pipeline(self) -> P {
        self.pipeline
    }
}

impl<P: Pipeline, R: RelevanceScorer> Evaluator for QuestionSetEvaluator<P, R> {
    fn evaluate_with_progress(
        &mut self,
        on_progress: &mut dyn FnMut(RunProgress),
    ) -> Result<EvaluateResult, EvalError> {
        self.engine.calculate(
            &self.questions,
            &mut self.pipeline,
            self.ground_truth.as_ref(),
            on_progress,
        )
    }
}
