//! Per-question result table and aggregation.
//!
//! A [`ResultTable`] has one row per question. Its logical columns are:
//!
//! ```text
//! question | answer | passage_id_1..k | passage_content_1..k | passage_scores_1..k | <metric>...
//! ```
//!
//! Every row carries exactly `k` passages, where `k` is the passage count of
//! the first question. Metric columns are appended by
//! [`ResultTable::add_metric_columns`] and averaged by [`ResultTable::mean`].

use super::ground_truth::{GroundTruth, SolutionMap};
use super::metrics::RetrievalMetric;
use super::runner::PipelineRun;
use super::scoring::{build_prediction, PredictionMap, RelevanceScorer};
use crate::error::EvalError;
use crate::types::Passage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One question's row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Question text
    pub question: String,
    /// Pipeline answer
    pub answer: String,
    /// Retrieved passages in retrieval order
    pub passages: Vec<Passage>,
    /// Relevance score of each passage
    pub scores: Vec<f64>,
    /// Metric values keyed by metric name
    pub metrics: BTreeMap<String, f64>,
}

impl ResultRow {
    /// Prediction map built from this row's passages and scores.
    pub fn prediction(&self) -> PredictionMap {
        build_prediction(&self.passages, &self.scores)
    }
}

/// Row-per-question evaluation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    k: usize,
    metric_columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Builds the table from a pipeline run, scoring every passage.
    ///
    /// Fails with [`EvalError::RunLength`] when the run does not cover
    /// every question exactly once, with [`EvalError::EmptyBatch`] when
    /// there are no questions, and with [`EvalError::RaggedPassages`] when a
    /// question returned a different number of passages than the first one.
    pub fn from_run<S, R>(questions: &[S], run: PipelineRun, scorer: &R) -> Result<Self, EvalError>
    where
        S: AsRef<str>,
        R: RelevanceScorer + ?Sized,
    {
        if run.answers.len() != questions.len() || run.passages.len() != questions.len() {
            return Err(EvalError::RunLength {
                expected: questions.len(),
                answers: run.answers.len(),
                passages: run.passages.len(),
            });
        }
        let k = run.passages.first().map(Vec::len).ok_or(EvalError::EmptyBatch)?;

        let mut rows = Vec::with_capacity(questions.len());
        for (index, ((question, answer), passages)) in questions
            .iter()
            .zip(run.answers)
            .zip(run.passages)
            .enumerate()
        {
            if passages.len() != k {
                return Err(EvalError::RaggedPassages {
                    index,
                    expected: k,
                    actual: passages.len(),
                });
            }
            let question = question.as_ref().to_string();
            let scores = scorer.score_all(&question, &passages);
            rows.push(ResultRow {
                question,
                answer,
                passages,
                scores,
                metrics: BTreeMap::new(),
            });
        }

        Ok(Self {
            k,
            metric_columns: Vec::new(),
            rows,
        })
    }

    /// Passages per question.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Table rows in question order.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metric column names in the order they were added.
    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    /// All logical column names.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns = vec!["question".to_string(), "answer".to_string()];
        for prefix in ["passage_id", "passage_content", "passage_scores"] {
            columns.extend((1..=self.k).map(|i| format!("{}_{}", prefix, i)));
        }
        columns.extend(self.metric_columns.iter().cloned());
        columns
    }

    /// Scores every row with each metric and appends one column per metric.
    ///
    /// Row `i` is scored against `ground_truth.solution(i)`, or against an
    /// empty solution when no ground truth is given.
    pub fn add_metric_columns(
        &mut self,
        metrics: &[Arc<dyn RetrievalMetric>],
        ground_truth: Option<&GroundTruth>,
    ) -> Result<(), EvalError> {
        let k = self.k;
        for (index, row) in self.rows.iter_mut().enumerate() {
            let solution = match ground_truth {
                Some(gt) => gt.solution(index)?,
                None => SolutionMap::new(),
            };
            let prediction = row.prediction();
            for metric in metrics {
                row.metrics.insert(
                    metric.name().to_string(),
                    metric.eval(&solution, &prediction, k),
                );
            }
        }

        for metric in metrics {
            let name = metric.name().to_string();
            if !self.metric_columns.contains(&name) {
                self.metric_columns.push(name);
            }
        }
        Ok(())
    }

    /// Values of a metric column in row order.
    pub fn metric_column(&self, name: &str) -> Option<Vec<f64>> {
        if !self.metric_columns.iter().any(|c| c == name) {
            return None;
        }
        self.rows
            .iter()
            .map(|row| row.metrics.get(name).copied())
            .collect()
    }

    /// Arithmetic mean of a metric column.
    ///
    /// NaN values propagate. Returns `None` for unknown or empty columns.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let column = self.metric_column(name)?;
        if column.is_empty() {
            return None;
        }
        Some(column.iter().sum::<f64>() / column.len() as f64)
    }

    /// Means of every metric column.
    pub fn means(&self) -> BTreeMap<String, f64> {
        self.metric_columns
            .iter()
            .filter_map(|name| self.mean(name).map(|m| (name.clone(), m)))
            .collect()
    }
}

/// Final outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateResult {
    /// Mean score per metric name
    pub results: BTreeMap<String, f64>,
    /// Metric names computed, in selection order
    pub use_metrics: Vec<String>,
    /// Full per-question table
    pub each_results: ResultTable,
}

impl EvaluateResult {
    /// Freezes a scored table into a result.
    pub fn from_table(table: ResultTable) -> Self {
        Self {
            results: table.means(),
            use_metrics: table.metric_columns().to_vec(),
            each_results: table,
        }
    }

    /// Mean score of a metric.
    pub fn mean(&self, name: &str) -> Option<f64> {
        self.results.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::metrics::{Precision, Recall};
    use crate::evaluation::scoring::ConstantScorer;
    use crate::types::PassageId;

    fn run(passages: Vec<Vec<&str>>) -> PipelineRun {
        PipelineRun {
            answers: passages.iter().map(|_| "answer".to_string()).collect(),
            passages: passages
                .into_iter()
                .map(|ids| ids.into_iter().map(|id| Passage::new(id, id)).collect())
                .collect(),
        }
    }

    fn ground_truth(ids: Vec<Vec<&str>>) -> GroundTruth {
        GroundTruth::unranked(
            ids.into_iter()
                .map(|row| row.into_iter().map(PassageId::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_k_from_first_question() {
        let table = ResultTable::from_run(
            &["Q1", "Q2"],
            run(vec![vec!["p1", "p2"], vec!["p3", "p4"]]),
            &ConstantScorer::default(),
        )
        .unwrap();
        assert_eq!(table.k(), 2);
        assert!(table.rows().iter().all(|r| r.passages.len() == 2));
        assert_eq!(table.rows()[0].scores, vec![1.0, 1.0]);
    }

    #[test]
    fn test_ragged_passages_rejected() {
        let result = ResultTable::from_run(
            &["Q1", "Q2"],
            run(vec![vec!["p1", "p2"], vec!["p3"]]),
            &ConstantScorer::default(),
        );
        assert!(matches!(
            result,
            Err(EvalError::RaggedPassages {
                index: 1,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_empty_run_rejected() {
        let questions: [&str; 0] = [];
        let result = ResultTable::from_run(&questions, run(vec![]), &ConstantScorer::default());
        assert!(matches!(result, Err(EvalError::EmptyBatch)));
    }

    #[test]
    fn test_run_must_cover_every_question() {
        let result = ResultTable::from_run(
            &["Q1", "Q2"],
            run(vec![vec!["p1", "p2"]]),
            &ConstantScorer::default(),
        );
        assert!(matches!(
            result,
            Err(EvalError::RunLength {
                expected: 2,
                answers: 1,
                passages: 1
            })
        ));

        let mut uneven = run(vec![vec!["p1"], vec!["p2"]]);
        uneven.answers.pop();
        let result = ResultTable::from_run(&["Q1", "Q2"], uneven, &ConstantScorer::default());
        assert!(matches!(
            result,
            Err(EvalError::RunLength {
                expected: 2,
                answers: 1,
                passages: 2
            })
        ));
    }

    #[test]
    fn test_column_names() {
        let table = ResultTable::from_run(
            &["Q1"],
            run(vec![vec!["p1", "p2"]]),
            &ConstantScorer::default(),
        )
        .unwrap();
        assert_eq!(
            table.column_names(),
            vec![
                "question",
                "answer",
                "passage_id_1",
                "passage_id_2",
                "passage_content_1",
                "passage_content_2",
                "passage_scores_1",
                "passage_scores_2",
            ]
        );
    }

    #[test]
    fn test_mean_is_sum_over_len() {
        let mut table = ResultTable::from_run(
            &["Q1", "Q2", "Q3"],
            run(vec![vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]),
            &ConstantScorer::default(),
        )
        .unwrap();
        let gt = ground_truth(vec![vec!["a"], vec!["x"], vec!["e", "f"]]);
        let metrics: Vec<Arc<dyn RetrievalMetric>> = vec![Arc::new(Recall), Arc::new(Precision)];
        table.add_metric_columns(&metrics, Some(&gt)).unwrap();

        let recall = table.metric_column("Recall").unwrap();
        assert_eq!(recall, vec![1.0, 0.0, 1.0]);
        let expected = recall.iter().sum::<f64>() / recall.len() as f64;
        assert_eq!(table.mean("Recall"), Some(expected));

        let precision = table.metric_column("Precision").unwrap();
        assert_eq!(precision, vec![0.5, 0.0, 1.0]);
        assert_eq!(table.mean("Precision"), Some(0.5));

        assert_eq!(table.metric_column("NDCG"), None);
    }

    #[test]
    fn test_nan_propagates_to_mean() {
        #[derive(Debug)]
        struct Undefined;

        impl RetrievalMetric for Undefined {
            fn name(&self) -> &'static str {
                "Undefined"
            }
            fn kind(&self) -> crate::evaluation::metrics::MetricKind {
                crate::evaluation::metrics::MetricKind::RankUnaware
            }
            fn eval(&self, _: &SolutionMap, _: &PredictionMap, _: usize) -> f64 {
                f64::NAN
            }
        }

        let mut table = ResultTable::from_run(
            &["Q1"],
            run(vec![vec!["a"]]),
            &ConstantScorer::default(),
        )
        .unwrap();
        let metrics: Vec<Arc<dyn RetrievalMetric>> = vec![Arc::new(Undefined)];
        table
            .add_metric_columns(&metrics, Some(&ground_truth(vec![vec!["a"]])))
            .unwrap();
        assert!(table.mean("Undefined").unwrap().is_nan());
    }

    #[test]
    fn test_evaluate_result_from_table() {
        let mut table = ResultTable::from_run(
            &["Q1", "Q2"],
            run(vec![vec!["p1", "p2"], vec!["p3", "p4"]]),
            &ConstantScorer::default(),
        )
        .unwrap();
        let metrics: Vec<Arc<dyn RetrievalMetric>> = vec![Arc::new(Recall)];
        table
            .add_metric_columns(&metrics, Some(&ground_truth(vec![vec!["p1"], vec!["p3"]])))
            .unwrap();

        let result = EvaluateResult::from_table(table);
        assert_eq!(result.use_metrics, vec!["Recall"]);
        assert_eq!(result.mean("Recall"), Some(1.0));
        assert_eq!(result.each_results.len(), 2);
    }
}
