//! Metric catalogs and name resolution.
//!
//! The registry holds three catalogs:
//!
//! | Catalog | Needs ground truth | Rank-aware | Metrics |
//! |---------|--------------------|------------|---------|
//! | without ground truth | no | - | none yet |
//! | rank-unaware | yes | no | TopK_Accuracy, EM, F1_score, Hole, Recall, Precision |
//! | rank-aware | yes | yes | AP, NDCG, CG, Ind_DCG, DCG, Ind_IDCG, IDCG, RR |
//!
//! Requested names are matched after normalization (lowercase, separators
//! removed), so `"ndcg"`, `"NDCG"` and `"n-dcg"` all select NDCG. An exact
//! normalized match wins; otherwise the first catalog entry whose normalized
//! name contains the token is used.

use super::metrics::{
    AveragePrecision, Cg, Dcg, ExactMatch, Hole, Idcg, IndDcg, IndIdcg, MetricKind, Ndcg,
    Precision, Recall, ReciprocalRank, RetrievalMetric, TopKAccuracy, F1,
};
use crate::error::EvalError;
use std::sync::Arc;
use tracing::{debug, warn};

/// What kind of ground truth an evaluation has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTruthAvailability {
    /// No ground truth
    None,
    /// Relevant passages without explicit ranks
    Unranked,
    /// Relevant passages with explicit ranks
    Ranked,
}

/// How unmatched metric names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Unknown names are an error
    #[default]
    Strict,
    /// Unknown names are logged and skipped
    Lenient,
}

/// Catalogs of available retrieval metrics.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    without_ground_truth: Vec<Arc<dyn RetrievalMetric>>,
    rank_unaware: Vec<Arc<dyn RetrievalMetric>>,
    rank_aware: Vec<Arc<dyn RetrievalMetric>>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    /// Creates a registry with the built-in catalogs.
    pub fn new() -> Self {
        Self {
            without_ground_truth: Vec::new(),
            rank_unaware: vec![
                Arc::new(TopKAccuracy),
                Arc::new(ExactMatch),
                Arc::new(F1),
                Arc::new(Hole),
                Arc::new(Recall),
                Arc::new(Precision),
            ],
            rank_aware: vec![
                Arc::new(AveragePrecision),
                Arc::new(Ndcg),
                Arc::new(Cg),
                Arc::new(IndDcg),
                Arc::new(Dcg),
                Arc::new(IndIdcg),
                Arc::new(Idcg),
                Arc::new(ReciprocalRank),
            ],
        }
    }

    /// Adds a metric to the catalog matching its kind.
    pub fn register(&mut self, metric: Arc<dyn RetrievalMetric>) {
        match metric.kind() {
            MetricKind::WithoutGroundTruth => self.without_ground_truth.push(metric),
            MetricKind::RankUnaware => self.rank_unaware.push(metric),
            MetricKind::RankAware => self.rank_aware.push(metric),
        }
    }

    /// Canonical names of every registered metric.
    pub fn names(&self) -> Vec<&'static str> {
        self.all().map(|m| m.name()).collect()
    }

    /// Resolves requested metric names into metric instances.
    ///
    /// Tokens are resolved in request order against the catalogs that the
    /// available ground truth allows. A token that names a known metric the
    /// ground truth cannot support is skipped. A token that names nothing is
    /// an [`EvalError::UnknownMetric`] in [`MatchMode::Strict`] and skipped in
    /// [`MatchMode::Lenient`]. Each metric appears at most once.
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        availability: GroundTruthAvailability,
        mode: MatchMode,
    ) -> Result<Vec<Arc<dyn RetrievalMetric>>, EvalError> {
        let consulted = self.consulted(availability);
        let mut resolved: Vec<Arc<dyn RetrievalMetric>> = Vec::new();

        for token in requested {
            let token = token.as_ref();
            let needle = normalize(token);

            match find_match(&consulted, &needle) {
                Some(metric) => {
                    if !resolved.iter().any(|m| m.name() == metric.name()) {
                        resolved.push(Arc::clone(metric));
                    }
                }
                None if find_match(&self.all().collect::<Vec<_>>(), &needle).is_some() => {
                    debug!(
                        "Skipping metric '{}': not applicable with {:?} ground truth",
                        token, availability
                    );
                }
                None => match mode {
                    MatchMode::Strict => return Err(EvalError::UnknownMetric(token.to_string())),
                    MatchMode::Lenient => warn!("Ignoring unknown metric '{}'", token),
                },
            }
        }

        Ok(resolved)
    }

    fn all(&self) -> impl Iterator<Item = &Arc<dyn RetrievalMetric>> {
        self.without_ground_truth
            .iter()
            .chain(&self.rank_unaware)
            .chain(&self.rank_aware)
    }

    fn consulted(&self, availability: GroundTruthAvailability) -> Vec<&Arc<dyn RetrievalMetric>> {
        let mut catalogs: Vec<&Arc<dyn RetrievalMetric>> =
            self.without_ground_truth.iter().collect();
        if availability != GroundTruthAvailability::None {
            catalogs.extend(&self.rank_unaware);
        }
        if availability == GroundTruthAvailability::Ranked {
            catalogs.extend(&self.rank_aware);
        }
        catalogs
    }
}

/// Lowercases and strips every non-alphanumeric character.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_match<'a>(
    candidates: &[&'a Arc<dyn RetrievalMetric>],
    needle: &str,
) -> Option<&'a Arc<dyn RetrievalMetric>> {
    if needle.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|m| normalize(m.name()) == needle)
        .or_else(|| {
            candidates
                .iter()
                .find(|m| normalize(m.name()).contains(needle))
        })
        .copied()
}
