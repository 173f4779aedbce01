//! Pipeline that replays recorded responses.

use super::benchmark::{BenchmarkDataset, DatasetError};
use crate::evaluation::runner::Pipeline;
use crate::types::Passage;
use std::collections::HashMap;
use thiserror::Error;

/// The question has no recorded response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No recorded response for question: {0}")]
pub struct UnrecordedQuestion(pub String);

/// A [`Pipeline`] answering from previously recorded responses.
///
/// Useful for scoring a pipeline offline: record its answers once, then
/// re-run the metrics as often as needed.
///
/// A question recorded more than once replays its responses in recording
/// order, wrapping back to the first after the last.
#[derive(Debug, Clone, Default)]
pub struct RecordedPipeline {
    responses: HashMap<String, Replay>,
}

/// Responses to one question and the next one to replay.
#[derive(Debug, Clone, Default)]
struct Replay {
    responses: Vec<(String, Vec<Passage>)>,
    next: usize,
}

impl Replay {
    fn next_response(&mut self) -> Option<(String, Vec<Passage>)> {
        let response = self.responses.get(self.next).cloned()?;
        self.next = (self.next + 1) % self.responses.len();
        Some(response)
    }
}

impl RecordedPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a response to `question`, after any earlier ones.
    pub fn record(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        passages: Vec<Passage>,
    ) {
        self.responses
            .entry(question.into())
            .or_default()
            .responses
            .push((answer.into(), passages));
    }

    /// Builds a pipeline from the responses stored in `dataset`.
    ///
    /// Every record must carry `retrieved`. A missing `answer` replays as an
    /// empty string.
    pub fn from_dataset(dataset: &BenchmarkDataset) -> Result<Self, DatasetError> {
        let mut pipeline = Self::new();
        for (index, record) in dataset.records().iter().enumerate() {
            let passages = record.retrieved.clone().ok_or_else(|| {
                DatasetError::Inconsistent(format!("record {} has no retrieved passages", index))
            })?;
            pipeline.record(
                record.question.clone(),
                record.answer.clone().unwrap_or_default(),
                passages,
            );
        }
        Ok(pipeline)
    }

    /// Number of recorded responses.
    pub fn len(&self) -> usize {
        self.responses.values().map(|r| r.responses.len()).sum()
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl Pipeline for RecordedPipeline {
    type Error = UnrecordedQuestion;

    fn run(&mut self, question: &str) -> Result<(String, Vec<Passage>), UnrecordedQuestion> {
        self.responses
            .get_mut(question)
            .and_then(Replay::next_response)
            .ok_or_else(|| UnrecordedQuestion(question.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::datasets::BenchmarkRecord;
    use crate::types::PassageId;

    #[test]
    fn test_replays_recorded_response() {
        let mut pipeline = RecordedPipeline::new();
        pipeline.record("Q1", "A1", vec![Passage::new("p1", "one")]);

        let (answer, passages) = pipeline.run("Q1").unwrap();
        assert_eq!(answer, "A1");
        assert_eq!(passages, vec![Passage::new("p1", "one")]);
    }

    #[test]
    fn test_unknown_question_fails() {
        let mut pipeline = RecordedPipeline::new();
        let err = pipeline.run("Q9").unwrap_err();
        assert_eq!(err, UnrecordedQuestion("Q9".to_string()));
        assert_eq!(err.to_string(), "No recorded response for question: Q9");
    }

    #[test]
    fn test_from_dataset() {
        let dataset = BenchmarkDataset::new(
            "recorded",
            vec![
                BenchmarkRecord::new("Q1").with_response("A1", vec![Passage::new("p1", "one")]),
                BenchmarkRecord {
                    answer: None,
                    ..BenchmarkRecord::new("Q2").with_response("", vec![Passage::new("p2", "two")])
                },
            ],
        )
        .unwrap();

        let mut pipeline = RecordedPipeline::from_dataset(&dataset).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.run("Q2").unwrap().0, "");
    }

    #[test]
    fn test_repeated_question_replays_in_order() {
        let mut pipeline = RecordedPipeline::new();
        pipeline.record("Q", "A1", vec![Passage::new("p1", "one")]);
        pipeline.record("Q", "A2", vec![Passage::new("p9", "nine")]);
        assert_eq!(pipeline.len(), 2);

        assert_eq!(pipeline.run("Q").unwrap().0, "A1");
        assert_eq!(pipeline.run("Q").unwrap().0, "A2");
        // Wraps so the recording can be replayed again
        let (answer, passages) = pipeline.run("Q").unwrap();
        assert_eq!(answer, "A1");
        assert_eq!(passages[0].id, PassageId::from("p1"));
    }

    #[test]
    fn test_from_dataset_requires_passages() {
        let dataset = BenchmarkDataset::new("bare", vec![BenchmarkRecord::new("Q1")]).unwrap();
        let result = RecordedPipeline::from_dataset(&dataset);
        assert!(matches!(result, Err(DatasetError::Inconsistent(_))));
    }
}
