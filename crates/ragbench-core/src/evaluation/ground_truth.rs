//! Ground truth construction.
//!
//! Ground truth arrives as one list of relevant passage identifiers per
//! question, optionally with a parallel list of explicit rank positions.
//! [`GroundTruth::solution`] turns one question's lists into the
//! [`SolutionMap`] that retrieval metrics consume.

use crate::error::EvalError;
use crate::types::PassageId;
use serde::{Deserialize, Serialize};

/// Relevant passages for one question, keyed by identifier string.
///
/// Each entry maps a passage key to its relevance rank, where rank 1 is the
/// most relevant passage. Entries keep their input order. Inserting a key
/// that is already present replaces its rank but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolutionMap {
    entries: Vec<(String, u32)>,
}

impl SolutionMap {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a solution ranking passages by list position (first = rank 1).
    pub fn from_positions(ids: &[PassageId]) -> Self {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (id.to_key(), i as u32 + 1))
            .collect()
    }

    /// Builds a solution from identifiers and their explicit ranks.
    ///
    /// Returns `None` when the two lists differ in length.
    pub fn from_ranked(ids: &[PassageId], ranks: &[u32]) -> Option<Self> {
        if ids.len() != ranks.len() {
            return None;
        }
        Some(
            ids.iter()
                .zip(ranks)
                .map(|(id, &rank)| (id.to_key(), rank))
                .collect(),
        )
    }

    /// Inserts or updates a passage rank.
    pub fn insert(&mut self, key: impl Into<String>, rank: u32) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = rank,
            None => self.entries.push((key, rank)),
        }
    }

    /// Returns the rank of a passage, if it is relevant.
    pub fn rank(&self, key: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, rank)| rank)
    }

    /// Returns true if the passage is relevant.
    pub fn contains(&self, key: &str) -> bool {
        self.rank(key).is_some()
    }

    /// Number of relevant passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no passage is relevant.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, rank)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, rank)| (k.as_str(), *rank))
    }

    /// Graded relevance of a passage, 0.0 if it is not relevant.
    ///
    /// A passage at rank `r` in a solution of `n` entries has relevance
    /// `n + 1 - r`, floored at 1, so rank 1 carries the largest gain.
    pub fn relevance(&self, key: &str) -> f64 {
        self.rank(key).map_or(0.0, |rank| self.grade(rank))
    }

    /// Graded relevances of all entries, highest first.
    pub fn ideal_relevances(&self) -> Vec<f64> {
        let mut grades: Vec<f64> = self.entries.iter().map(|&(_, r)| self.grade(r)).collect();
        grades.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        grades
    }

    fn grade(&self, rank: u32) -> f64 {
        let n = self.entries.len() as i64;
        (n + 1 - rank as i64).max(1) as f64
    }
}

impl FromIterator<(String, u32)> for SolutionMap {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut solution = SolutionMap::new();
        for (key, rank) in iter {
            solution.insert(key, rank);
        }
        solution
    }
}

/// Ground truth for a whole question batch.
///
/// `passage_ids[i]` lists the relevant passages of question `i`. When `ranks`
/// is present, `ranks[i][j]` is the explicit rank of `passage_ids[i][j]` and
/// rank-aware metrics become available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Relevant passage identifiers per question
    pub passage_ids: Vec<Vec<PassageId>>,
    /// Optional explicit ranks, parallel to `passage_ids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranks: Option<Vec<Vec<u32>>>,
}

impl GroundTruth {
    /// Ground truth ranked by list position.
    pub fn unranked(passage_ids: Vec<Vec<PassageId>>) -> Self {
        Self {
            passage_ids,
            ranks: None,
        }
    }

    /// Ground truth with explicit ranks.
    pub fn ranked(passage_ids: Vec<Vec<PassageId>>, ranks: Vec<Vec<u32>>) -> Self {
        Self {
            passage_ids,
            ranks: Some(ranks),
        }
    }

    /// Returns true if explicit ranks were supplied.
    pub fn is_rank_aware(&self) -> bool {
        self.ranks.is_some()
    }

    /// Number of questions covered.
    pub fn len(&self) -> usize {
        self.passage_ids.len()
    }

    /// Returns true if no question is covered.
    pub fn is_empty(&self) -> bool {
        self.passage_ids.is_empty()
    }

    /// Checks that the ground truth lines up with a batch of `num_questions`.
    pub fn validate(&self, num_questions: usize) -> Result<(), EvalError> {
        if self.passage_ids.len() != num_questions {
            return Err(EvalError::GroundTruthLength {
                expected: num_questions,
                actual: self.passage_ids.len(),
            });
        }
        if let Some(ranks) = &self.ranks {
            if ranks.len() != num_questions {
                return Err(EvalError::GroundTruthLength {
                    expected: num_questions,
                    actual: ranks.len(),
                });
            }
            for (index, (ids, order)) in self.passage_ids.iter().zip(ranks).enumerate() {
                if ids.len() != order.len() {
                    return Err(EvalError::RankLength {
                        index,
                        expected: ids.len(),
                        actual: order.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds the solution map of question `index`.
    pub fn solution(&self, index: usize) -> Result<SolutionMap, EvalError> {
        let ids = self
            .passage_ids
            .get(index)
            .ok_or(EvalError::GroundTruthLength {
                expected: index + 1,
                actual: self.passage_ids.len(),
            })?;

        match &self.ranks {
            None => Ok(SolutionMap::from_positions(ids)),
            Some(ranks) => {
                let order = ranks.get(index).map(Vec::as_slice).unwrap_or_default();
                SolutionMap::from_ranked(ids, order).ok_or(EvalError::RankLength {
                    index,
                    expected: ids.len(),
                    actual: order.len(),
                })
            }
        }
    }
}
