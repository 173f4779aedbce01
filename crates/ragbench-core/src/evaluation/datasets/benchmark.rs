//! Recorded benchmark datasets.
//!
//! A benchmark dataset is a list of question records, optionally carrying
//! ground truth and a recorded pipeline response. Two on-disk layouts are
//! accepted:
//!
//! ```text
//! bench.json    {"name": "...", "records": [{...}, {...}]}
//! bench.jsonl   one record per line; the file stem is the dataset name
//! ```
//!
//! A record looks like:
//!
//! ```json
//! {
//!   "question": "Who wrote Hamlet?",
//!   "retrieval_gt": ["p1", "p7"],
//!   "retrieval_gt_order": [1, 2],
//!   "answer": "Shakespeare",
//!   "retrieved": [{"id": "p1", "content": "..."}]
//! }
//! ```
//!
//! `retrieval_gt` is all-or-none across the records, and so is
//! `retrieval_gt_order`, which additionally requires `retrieval_gt`.

use super::EvalDataset;
use crate::error::EvalError;
use crate::evaluation::ground_truth::GroundTruth;
use crate::types::{Passage, PassageId};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Errors
// ============================================================================

/// Error type for dataset loading.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid data format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Records disagree on which optional fields they carry.
    #[error("Inconsistent dataset: {0}")]
    Inconsistent(String),
}

impl From<DatasetError> for EvalError {
    fn from(err: DatasetError) -> Self {
        EvalError::Dataset(err.to_string())
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// One question of a benchmark dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Question text.
    pub question: String,
    /// Relevant passage identifiers, most relevant first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_gt: Option<Vec<PassageId>>,
    /// Explicit ranks parallel to `retrieval_gt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_gt_order: Option<Vec<u32>>,
    /// Recorded pipeline answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Recorded pipeline passages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved: Option<Vec<Passage>>,
}

impl BenchmarkRecord {
    /// Creates a record holding only a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            retrieval_gt: None,
            retrieval_gt_order: None,
            answer: None,
            retrieved: None,
        }
    }

    /// Sets the relevant passages.
    pub fn with_ground_truth<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PassageId>,
    {
        self.retrieval_gt = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Sets explicit ranks for the relevant passages.
    pub fn with_ground_truth_order(mut self, ranks: Vec<u32>) -> Self {
        self.retrieval_gt_order = Some(ranks);
        self
    }

    /// Sets the recorded pipeline response.
    pub fn with_response(mut self, answer: impl Into<String>, retrieved: Vec<Passage>) -> Self {
        self.answer = Some(answer.into());
        self.retrieved = Some(retrieved);
        self
    }
}

#[derive(Deserialize)]
struct DatasetFile {
    name: String,
    records: Vec<BenchmarkRecord>,
}

/// A validated benchmark dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkDataset {
    name: String,
    records: Vec<BenchmarkRecord>,
}

impl BenchmarkDataset {
    /// Creates a dataset, checking that optional fields are used consistently.
    pub fn new(
        name: impl Into<String>,
        records: Vec<BenchmarkRecord>,
    ) -> Result<Self, DatasetError> {
        let name = name.into();
        if records.is_empty() {
            return Err(DatasetError::InvalidFormat(format!(
                "dataset '{}' has no records",
                name
            )));
        }

        let with_gt = records.iter().filter(|r| r.retrieval_gt.is_some()).count();
        if with_gt != 0 && with_gt != records.len() {
            return Err(DatasetError::Inconsistent(format!(
                "{} of {} records carry retrieval_gt",
                with_gt,
                records.len()
            )));
        }

        let with_order = records
            .iter()
            .filter(|r| r.retrieval_gt_order.is_some())
            .count();
        if with_order != 0 && with_order != records.len() {
            return Err(DatasetError::Inconsistent(format!(
                "{} of {} records carry retrieval_gt_order",
                with_order,
                records.len()
            )));
        }
        if with_order != 0 && with_gt == 0 {
            return Err(DatasetError::Inconsistent(
                "retrieval_gt_order given without retrieval_gt".to_string(),
            ));
        }

        for (index, record) in records.iter().enumerate() {
            if let (Some(ids), Some(order)) = (&record.retrieval_gt, &record.retrieval_gt_order) {
                if ids.len() != order.len() {
                    return Err(DatasetError::Inconsistent(format!(
                        "record {} has {} ranks for {} ground truth passages",
                        index,
                        order.len(),
                        ids.len()
                    )));
                }
            }
        }

        debug!("Dataset '{}' has {} records", name, records.len());
        Ok(Self { name, records })
    }

    /// Dataset records in question order.
    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    /// Returns true if every record carries a recorded response.
    pub fn has_responses(&self) -> bool {
        self.records.iter().all(|r| r.retrieved.is_some())
    }
}

impl EvalDataset for BenchmarkDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn questions(&self) -> Vec<String> {
        self.records.iter().map(|r| r.question.clone()).collect()
    }

    fn ground_truth(&self) -> Option<GroundTruth> {
        let passage_ids: Option<Vec<Vec<PassageId>>> = self
            .records
            .iter()
            .map(|r| r.retrieval_gt.clone())
            .collect();
        let ranks: Option<Vec<Vec<u32>>> = self
            .records
            .iter()
            .map(|r| r.retrieval_gt_order.clone())
            .collect();

        passage_ids.map(|ids| match ranks {
            Some(ranks) => GroundTruth::ranked(ids, ranks),
            None => GroundTruth::unranked(ids),
        })
    }

    fn num_questions(&self) -> usize {
        self.records.len()
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Loads a benchmark dataset from a `.json` or `.jsonl` file.
///
/// # Example
///
/// ```ignore
/// let dataset = load_dataset(Path::new("data/bench.jsonl"))?;
/// println!("Loaded {} questions", dataset.num_questions());
/// ```
pub fn load_dataset(path: &Path) -> Result<BenchmarkDataset, DatasetError> {
    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    let dataset = if is_jsonl {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        BenchmarkDataset::new(name, load_jsonl(path)?)?
    } else {
        let file: DatasetFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        BenchmarkDataset::new(file.name, file.records)?
    };

    info!(
        "Loaded dataset '{}' with {} questions from {}",
        dataset.name(),
        dataset.num_questions(),
        path.display()
    );
    Ok(dataset)
}

/// Loads a JSONL file into a vector of deserialized items.
fn load_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|e| {
            DatasetError::InvalidFormat(format!("Line {}: {}", line_num + 1, e))
        })?;
        items.push(item);
    }

    Ok(items)
}

// ============================================================================
// Tests
// ============================================================================
