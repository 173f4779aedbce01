//! Evaluation framework for measuring retrieval quality of RAG pipelines.
//!
//! Given questions, a [`Pipeline`] that answers them with supporting
//! passages, and optional [`GroundTruth`], the framework computes standard
//! Information Retrieval (IR) metrics per question and in aggregate.
//!
//! # Overview
//!
//! | Stage | Type | Role |
//! |-------|------|------|
//! | Resolve | [`MetricRegistry`] | Metric names to metric instances |
//! | Run | [`run_pipeline`] | One pipeline call per question, in order |
//! | Tabulate | [`ResultTable`] | Row per question, column per metric |
//! | Aggregate | [`EvaluateResult`] | Mean per metric |
//!
//! [`MetricEngine`] ties the stages together; [`Evaluator`] implementations
//! such as [`QuestionSetEvaluator`] and [`datasets::DatasetEvaluator`] supply
//! the data.
//!
//! # Example
//!
//! ```
//! use ragbench_core::config::MetricSelection;
//! use ragbench_core::evaluation::{calculate_metrics, GroundTruth, Pipeline};
//! use ragbench_core::types::Passage;
//! use std::convert::Infallible;
//!
//! struct Fixed;
//!
//! impl Pipeline for Fixed {
//!     type Error = Infallible;
//!
//!     fn run(&mut self, question: &str) -> Result<(String, Vec<Passage>), Infallible> {
//!         Ok((question.to_uppercase(), vec![Passage::new("p1", "text")]))
//!     }
//! }
//!
//! let ground_truth = GroundTruth::unranked(vec![vec!["p1".into()]]);
//! let result = calculate_metrics(
//!     &MetricSelection::named(["recall"]),
//!     &["q1"],
//!     Fixed,
//!     Some(&ground_truth),
//! )
//! .unwrap();
//! assert_eq!(result.mean("Recall"), Some(1.0));
//! ```
//!
//! # Metrics Reference
//!
//! | Metric | Description | Needs ranks |
//! |--------|-------------|-------------|
//! | Recall | Fraction of relevant passages retrieved | no |
//! | Precision | Fraction of retrieved passages that are relevant | no |
//! | F1_score | Harmonic mean of Precision and Recall | no |
//! | TopK_Accuracy | Any relevant passage retrieved | no |
//! | EM | Every relevant passage retrieved | no |
//! | Hole | Fraction of retrieved passages without a judgment | no |
//! | AP | Average Precision | yes |
//! | RR | Reciprocal Rank of the first relevant passage | yes |
//! | CG | Cumulative Gain | yes |
//! | DCG / IDCG | Discounted Cumulative Gain and its ideal | yes |
//! | Ind_DCG / Ind_IDCG | Exponential-gain DCG and its ideal | yes |
//! | NDCG | DCG normalized by IDCG | yes |

pub mod datasets;
pub mod evaluator;
pub mod ground_truth;
pub mod metrics;
pub mod registry;
pub mod runner;
pub mod scoring;
pub mod table;

pub use evaluator::{calculate_metrics, Evaluator, MetricEngine, QuestionSetEvaluator};
pub use ground_truth::{GroundTruth, SolutionMap};
pub use metrics::{MetricKind, RetrievalMetric};
pub use registry::{GroundTruthAvailability, MatchMode, MetricRegistry};
pub use runner::{run_pipeline, Pipeline, PipelineRun, ProgressTimer, RunProgress};
pub use scoring::{ConstantScorer, PredictionMap, RelevanceScorer};
pub use table::{EvaluateResult, ResultRow, ResultTable};
