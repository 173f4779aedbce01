//! Retrieval metrics scored against a per-question solution.
//!
//! Every metric implements [`RetrievalMetric`] and is evaluated on a
//! [`SolutionMap`] (relevant passages with ranks), a [`PredictionMap`]
//! (retrieved passages in order) and a cutoff `k`. Only the first `k`
//! predicted passages are considered.
//!
//! Set-based metrics:
//! - Precision, Recall, F1
//! - TopK Accuracy, Exact Match, Hole
//!
//! Rank-aware metrics (use graded relevance from solution ranks):
//! - AP, RR
//! - CG, DCG, IDCG, NDCG
//! - Ind_DCG, Ind_IDCG (exponential gain variants)
//!
//! # References
//!
//! - Järvelin & Kekäläinen (2002). "Cumulated gain-based evaluation of IR techniques"
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"

use super::ground_truth::SolutionMap;
use super::scoring::PredictionMap;
use serde::Serialize;
use std::fmt;

/// Which inputs a metric needs and whether it depends on ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricKind {
    /// Scored without ground truth
    WithoutGroundTruth,
    /// Needs ground truth, ignores ranking
    RankUnaware,
    /// Needs ground truth with explicit ranks
    RankAware,
}

/// A retrieval quality metric.
///
/// Implementations are stateless; one instance is shared across every
/// question of an evaluation.
pub trait RetrievalMetric: fmt::Debug + Send + Sync {
    /// Canonical metric name, used as the result column name.
    fn name(&self) -> &'static str;

    /// Metric category.
    fn kind(&self) -> MetricKind;

    /// Scores one question.
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64;

    /// Returns true if the metric needs ground truth.
    fn requires_ground_truth(&self) -> bool {
        self.kind() != MetricKind::WithoutGroundTruth
    }

    /// Returns true if the metric depends on ranking.
    fn is_rank_aware(&self) -> bool {
        self.kind() == MetricKind::RankAware
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Keys of the first `k` predictions, in retrieval order.
fn top_k(prediction: &PredictionMap, k: usize) -> impl Iterator<Item = &str> {
    prediction.keys().take(k)
}

/// Number of relevant passages among the first `k` predictions.
fn hits_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> usize {
    top_k(prediction, k)
        .filter(|key| solution.contains(key))
        .count()
}

/// Logarithmic discount for a 1-indexed position: log₂(position + 1).
#[inline]
fn discount(position: usize) -> f64 {
    (position as f64 + 1.0).log2()
}

/// Exponential gain: 2^rel - 1.
#[inline]
fn exp_gain(relevance: f64) -> f64 {
    relevance.exp2() - 1.0
}

fn discounted_sum(gains: impl Iterator<Item = f64>) -> f64 {
    gains
        .enumerate()
        .map(|(i, gain)| gain / discount(i + 1))
        .sum()
}

// ============================================================================
// Set-based metrics
// ============================================================================

/// Precision@k: fraction of the top k predictions that are relevant.
///
/// ```text
/// P@k = |relevant ∩ top_k| / k
/// ```
///
/// Returns 0.0 when `k` is 0.
pub fn precision_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    hits_at_k(solution, prediction, k) as f64 / k as f64
}

/// Recall@k: fraction of relevant passages found in the top k predictions.
///
/// ```text
/// R@k = |relevant ∩ top_k| / |relevant|
/// ```
///
/// Returns 0.0 when the solution is empty.
pub fn recall_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if solution.is_empty() {
        return 0.0;
    }
    hits_at_k(solution, prediction, k) as f64 / solution.len() as f64
}

/// F1@k: harmonic mean of Precision@k and Recall@k, 0.0 if both are 0.
pub fn f1_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    let precision = precision_at_k(solution, prediction, k);
    let recall = recall_at_k(solution, prediction, k);

    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// 1.0 if any of the top k predictions is relevant.
pub fn top_k_accuracy(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if hits_at_k(solution, prediction, k) > 0 {
        1.0
    } else {
        0.0
    }
}

/// 1.0 if every relevant passage appears in the top k predictions.
///
/// An empty solution scores 0.0.
pub fn exact_match(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if solution.is_empty() {
        return 0.0;
    }
    let all_found = solution
        .iter()
        .all(|(key, _)| top_k(prediction, k).any(|p| p == key));
    if all_found {
        1.0
    } else {
        0.0
    }
}

/// Hole@k: fraction of the top k predictions with no relevance judgment.
pub fn hole_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let unjudged = top_k(prediction, k)
        .filter(|key| !solution.contains(key))
        .count();
    unjudged as f64 / k as f64
}

// ============================================================================
// Rank-aware metrics
// ============================================================================

/// Average Precision over the top k predictions.
///
/// ```text
/// AP@k = (1 / |relevant|) * Σ P(i) * rel(i)   for i in 1..=k
/// ```
///
/// Returns 0.0 when the solution is empty.
pub fn average_precision(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    if solution.is_empty() {
        return 0.0;
    }

    let mut precision_sum = 0.0;
    let mut relevant_found = 0;

    for (i, key) in top_k(prediction, k).enumerate() {
        if solution.contains(key) {
            relevant_found += 1;
            precision_sum += relevant_found as f64 / (i + 1) as f64;
        }
    }

    precision_sum / solution.len() as f64
}

/// Reciprocal Rank: 1 / position of the first relevant prediction, 0.0 if none.
pub fn reciprocal_rank(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    top_k(prediction, k)
        .position(|key| solution.contains(key))
        .map_or(0.0, |i| 1.0 / (i + 1) as f64)
}

/// Cumulative Gain: sum of graded relevance over the top k predictions.
pub fn cumulative_gain(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    top_k(prediction, k).map(|key| solution.relevance(key)).sum()
}

/// Discounted Cumulative Gain with linear gain.
///
/// ```text
/// DCG@k = Σ rel_i / log₂(i + 1)   for i in 1..=k
/// ```
pub fn dcg_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    discounted_sum(top_k(prediction, k).map(|key| solution.relevance(key)))
}

/// Ideal DCG: DCG of the solution sorted by relevance.
pub fn idcg_at_k(solution: &SolutionMap, k: usize) -> f64 {
    discounted_sum(solution.ideal_relevances().into_iter().take(k))
}

/// Industry DCG with exponential gain.
///
/// ```text
/// Ind_DCG@k = Σ (2^rel_i - 1) / log₂(i + 1)   for i in 1..=k
/// ```
pub fn ind_dcg_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    discounted_sum(top_k(prediction, k).map(|key| exp_gain(solution.relevance(key))))
}

/// Industry ideal DCG: Ind_DCG of the solution sorted by relevance.
pub fn ind_idcg_at_k(solution: &SolutionMap, k: usize) -> f64 {
    discounted_sum(
        solution
            .ideal_relevances()
            .into_iter()
            .take(k)
            .map(exp_gain),
    )
}

/// Normalized DCG: DCG@k / IDCG@k, 0.0 when there is nothing relevant.
pub fn ndcg_at_k(solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
    let idcg = idcg_at_k(solution, k);
    if idcg == 0.0 {
        0.0
    } else {
        dcg_at_k(solution, prediction, k) / idcg
    }
}

// ============================================================================
// Metric types
// ============================================================================

/// TopK accuracy metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopKAccuracy;

impl RetrievalMetric for TopKAccuracy {
    fn name(&self) -> &'static str {
        "TopK_Accuracy"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        top_k_accuracy(solution, prediction, k)
    }
}

/// Exact match metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl RetrievalMetric for ExactMatch {
    fn name(&self) -> &'static str {
        "EM"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        exact_match(solution, prediction, k)
    }
}

/// F1 metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct F1;

impl RetrievalMetric for F1 {
    fn name(&self) -> &'static str {
        "F1_score"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        f1_at_k(solution, prediction, k)
    }
}

/// Hole metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hole;

impl RetrievalMetric for Hole {
    fn name(&self) -> &'static str {
        "Hole"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        hole_at_k(solution, prediction, k)
    }
}

/// Recall metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recall;

impl RetrievalMetric for Recall {
    fn name(&self) -> &'static str {
        "Recall"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        recall_at_k(solution, prediction, k)
    }
}

/// Precision metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Precision;

impl RetrievalMetric for Precision {
    fn name(&self) -> &'static str {
        "Precision"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankUnaware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        precision_at_k(solution, prediction, k)
    }
}

/// Average precision metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragePrecision;

impl RetrievalMetric for AveragePrecision {
    fn name(&self) -> &'static str {
        "AP"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        average_precision(solution, prediction, k)
    }
}

/// Normalized discounted cumulative gain metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ndcg;

impl RetrievalMetric for Ndcg {
    fn name(&self) -> &'static str {
        "NDCG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        ndcg_at_k(solution, prediction, k)
    }
}

/// Cumulative gain metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cg;

impl RetrievalMetric for Cg {
    fn name(&self) -> &'static str {
        "CG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        cumulative_gain(solution, prediction, k)
    }
}

/// Industry DCG metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndDcg;

impl RetrievalMetric for IndDcg {
    fn name(&self) -> &'static str {
        "Ind_DCG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        ind_dcg_at_k(solution, prediction, k)
    }
}

/// Discounted cumulative gain metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dcg;

impl RetrievalMetric for Dcg {
    fn name(&self) -> &'static str {
        "DCG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        dcg_at_k(solution, prediction, k)
    }
}

/// Industry ideal DCG metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndIdcg;

impl RetrievalMetric for IndIdcg {
    fn name(&self) -> &'static str {
        "Ind_IDCG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, _prediction: &PredictionMap, k: usize) -> f64 {
        ind_idcg_at_k(solution, k)
    }
}

/// Ideal DCG metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idcg;

impl RetrievalMetric for Idcg {
    fn name(&self) -> &'static str {
        "IDCG"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, _prediction: &PredictionMap, k: usize) -> f64 {
        idcg_at_k(solution, k)
    }
}

/// Reciprocal rank metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReciprocalRank;

impl RetrievalMetric for ReciprocalRank {
    fn name(&self) -> &'static str {
        "RR"
    }
    fn kind(&self) -> MetricKind {
        MetricKind::RankAware
    }
    fn eval(&self, solution: &SolutionMap, prediction: &PredictionMap, k: usize) -> f64 {
        reciprocal_rank(solution, prediction, k)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(ids: &[&str]) -> PredictionMap {
        ids.iter().map(|&id| (id.to_string(), 1.0)).collect()
    }

    fn solution(ids: &[&str]) -> SolutionMap {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| (id.to_string(), i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_precision_at_k() {
        // Predicted [1, 2, 3, 4, 5] with [1, 3] relevant
        let pred = prediction(&["1", "2", "3", "4", "5"]);
        let sol = solution(&["1", "3"]);

        assert!((precision_at_k(&sol, &pred, 1) - 1.0).abs() < 1e-9);
        assert!((precision_at_k(&sol, &pred, 2) - 0.5).abs() < 1e-9);
        assert!((precision_at_k(&sol, &pred, 3) - 2.0 / 3.0).abs() < 1e-9);
        assert!((precision_at_k(&sol, &pred, 5) - 0.4).abs() < 1e-9);
        assert_eq!(precision_at_k(&sol, &pred, 0), 0.0);
    }

    #[test]
    fn test_recall_at_k() {
        // "10" is relevant but never retrieved
        let pred = prediction(&["1", "2", "3", "4", "5"]);
        let sol = solution(&["1", "3", "10"]);

        assert!((recall_at_k(&sol, &pred, 1) - 1.0 / 3.0).abs() < 1e-9);
        assert!((recall_at_k(&sol, &pred, 3) - 2.0 / 3.0).abs() < 1e-9);
        assert!((recall_at_k(&sol, &pred, 5) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(recall_at_k(&SolutionMap::new(), &pred, 5), 0.0);
    }

    #[test]
    fn test_f1_at_k() {
        let pred = prediction(&["1", "2", "3", "4", "5"]);
        let sol = solution(&["1", "3", "10"]);

        // P@5 = 0.4, R@5 = 2/3, F1 = 0.5
        assert!((f1_at_k(&sol, &pred, 5) - 0.5).abs() < 1e-9);
        assert_eq!(f1_at_k(&solution(&["9"]), &pred, 5), 0.0);
    }

    #[test]
    fn test_top_k_accuracy_and_exact_match() {
        let pred = prediction(&["a", "b", "c"]);

        assert_eq!(top_k_accuracy(&solution(&["c"]), &pred, 3), 1.0);
        assert_eq!(top_k_accuracy(&solution(&["c"]), &pred, 2), 0.0);

        assert_eq!(exact_match(&solution(&["a", "c"]), &pred, 3), 1.0);
        assert_eq!(exact_match(&solution(&["a", "z"]), &pred, 3), 0.0);
        assert_eq!(exact_match(&SolutionMap::new(), &pred, 3), 0.0);
    }

    #[test]
    fn test_hole_counts_unjudged() {
        let pred = prediction(&["a", "b", "c", "d"]);
        let sol = solution(&["a"]);
        assert!((hole_at_k(&sol, &pred, 4) - 0.75).abs() < 1e-9);
        assert_eq!(hole_at_k(&sol, &pred, 1), 0.0);
    }

    #[test]
    fn test_average_precision() {
        // AP = (P@1 + P@3) / 2 = (1.0 + 2/3) / 2
        let pred = prediction(&["1", "2", "3", "4", "5"]);
        let sol = solution(&["1", "3"]);

        let ap = average_precision(&sol, &pred, 5);
        assert!((ap - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_reciprocal_rank() {
        let sol = solution(&["3"]);

        assert!((reciprocal_rank(&sol, &prediction(&["3", "1", "2"]), 3) - 1.0).abs() < 1e-9);
        assert!((reciprocal_rank(&sol, &prediction(&["1", "2", "3"]), 3) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(reciprocal_rank(&sol, &prediction(&["1", "2", "4"]), 3), 0.0);
        // Outside the cutoff
        assert_eq!(reciprocal_rank(&sol, &prediction(&["1", "2", "3"]), 2), 0.0);
    }

    #[test]
    fn test_ndcg_perfect_ranking() {
        let sol = solution(&["a", "b"]);
        let ndcg = ndcg_at_k(&sol, &prediction(&["a", "b", "c"]), 3);
        assert!((ndcg - 1.0).abs() < 1e-9, "Perfect ranking should have NDCG = 1.0");
    }

    #[test]
    fn test_ndcg_reversed_ranking() {
        let sol = solution(&["a", "b"]);
        let ndcg = ndcg_at_k(&sol, &prediction(&["c", "b", "a"]), 3);
        assert!(ndcg < 0.9, "Reversed ranking should have lower NDCG");
        assert!(ndcg > 0.5, "Should still find some relevant passages");
    }

    #[test]
    fn test_ndcg_no_relevant() {
        assert_eq!(ndcg_at_k(&SolutionMap::new(), &prediction(&["a"]), 1), 0.0);
    }

    #[test]
    fn test_gain_family() {
        // Solution a (rel 2), b (rel 1); predicted [b, a]
        let sol = solution(&["a", "b"]);
        let pred = prediction(&["b", "a"]);

        assert!((cumulative_gain(&sol, &pred, 2) - 3.0).abs() < 1e-9);

        // DCG = 1/log2(2) + 2/log2(3)
        let dcg = 1.0 + 2.0 / 3f64.log2();
        assert!((dcg_at_k(&sol, &pred, 2) - dcg).abs() < 1e-9);

        // IDCG = 2/log2(2) + 1/log2(3)
        let idcg = 2.0 + 1.0 / 3f64.log2();
        assert!((idcg_at_k(&sol, 2) - idcg).abs() < 1e-9);

        // Ind_DCG = (2^1-1)/1 + (2^2-1)/log2(3)
        let ind_dcg = 1.0 + 3.0 / 3f64.log2();
        assert!((ind_dcg_at_k(&sol, &pred, 2) - ind_dcg).abs() < 1e-9);

        let ind_idcg = 3.0 + 1.0 / 3f64.log2();
        assert!((ind_idcg_at_k(&sol, 2) - ind_idcg).abs() < 1e-9);
    }

    #[test]
    fn test_metric_kinds() {
        assert!(!Recall.is_rank_aware());
        assert!(Recall.requires_ground_truth());
        assert!(Ndcg.is_rank_aware());
        assert_eq!(Ndcg.name(), "NDCG");
        assert_eq!(F1.name(), "F1_score");
    }
}
