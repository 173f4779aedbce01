//! Prediction-side relevance scoring.
//!
//! Every retrieved passage carries a relevance score in the result table and
//! in the [`PredictionMap`] handed to metrics. Scores come from a
//! [`RelevanceScorer`]; the default [`ConstantScorer`] gives every passage
//! the same placeholder score, so metrics rank predictions purely by the
//! order the pipeline returned them in.

use crate::config::PLACEHOLDER_RELEVANCE_SCORE;
use crate::types::Passage;
use serde::Serialize;

/// Retrieved passages for one question, keyed by identifier string.
///
/// Entries keep retrieval order, which rank-aware metrics rely on.
/// Inserting a key that is already present replaces its score but keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionMap {
    entries: Vec<(String, f64)>,
}

impl PredictionMap {
    /// Creates an empty prediction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a passage score.
    pub fn insert(&mut self, key: impl Into<String>, score: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((key, score)),
        }
    }

    /// Returns the score of a passage.
    pub fn score(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, score)| score)
    }

    /// Passage keys in retrieval order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over `(key, score)` pairs in retrieval order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), *s))
    }

    /// Number of distinct predicted passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was predicted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for PredictionMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut prediction = PredictionMap::new();
        for (key, score) in iter {
            prediction.insert(key, score);
        }
        prediction
    }
}

/// Strategy for scoring how relevant a retrieved passage is to its question.
pub trait RelevanceScorer {
    /// Scores `passage`, retrieved at 0-based `position` for `question`.
    fn score(&self, question: &str, passage: &Passage, position: usize) -> f64;

    /// Scores a full retrieval result in order.
    fn score_all(&self, question: &str, passages: &[Passage]) -> Vec<f64> {
        passages
            .iter()
            .enumerate()
            .map(|(i, passage)| self.score(question, passage, i))
            .collect()
    }
}

/// Scorer that assigns the same score to every passage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantScorer(pub f64);

impl Default for ConstantScorer {
    fn default() -> Self {
        Self(PLACEHOLDER_RELEVANCE_SCORE)
    }
}

impl RelevanceScorer for ConstantScorer {
    fn score(&self, _question: &str, _passage: &Passage, _position: usize) -> f64 {
        self.0
    }
}

impl<F> RelevanceScorer for F
where
    F: Fn(&str, &Passage, usize) -> f64,
{
    fn score(&self, question: &str, passage: &Passage, position: usize) -> f64 {
        self(question, passage, position)
    }
}

/// Builds the prediction map of one question from its passages and scores.
pub fn build_prediction(passages: &[Passage], scores: &[f64]) -> PredictionMap {
    passages
        .iter()
        .zip(scores)
        .map(|(passage, &score)| (passage.id.to_key(), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages() -> Vec<Passage> {
        vec![Passage::new("p1", "first"), Passage::new("p2", "second")]
    }

    #[test]
    fn test_constant_scorer_default_is_placeholder() {
        let scores = ConstantScorer::default().score_all("Q1", &passages());
        assert_eq!(scores, vec![1.0, 1.0]);
    }

    #[test]
    fn test_closure_scorer() {
        let by_position = |_: &str, _: &Passage, i: usize| 1.0 / (i + 1) as f64;
        let scores = by_position.score_all("Q1", &passages());
        assert_eq!(scores, vec![1.0, 0.5]);
    }

    #[test]
    fn test_prediction_keeps_retrieval_order() {
        let prediction = build_prediction(&passages(), &[1.0, 1.0]);
        let keys: Vec<&str> = prediction.keys().collect();
        assert_eq!(keys, vec!["p1", "p2"]);
        assert_eq!(prediction.score("p2"), Some(1.0));
        assert_eq!(prediction.score("p3"), None);
    }
}
