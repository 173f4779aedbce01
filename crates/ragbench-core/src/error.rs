//! Error types for ragbench-core.
//!
//! This module defines the errors raised while selecting metrics, running a
//! pipeline over a question batch, building ground truth, and configuring
//! embedding providers.

use thiserror::Error;

/// Boxed error returned by a pipeline implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while computing an evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Invalid evaluator configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Requested metric name matched no known metric
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    /// No questions were supplied
    #[error("Cannot evaluate an empty question batch")]
    EmptyBatch,
    /// A pipeline run returned a different number of passages than the first run
    #[error("Question {index} returned {actual} passages, expected {expected}")]
    RaggedPassages {
        /// Position of the offending question
        index: usize,
        /// Passage count of the first question
        expected: usize,
        /// Passage count of this question
        actual: usize,
    },
    /// Ground truth list count differs from question count
    #[error("Ground truth covers {actual} questions, expected {expected}")]
    GroundTruthLength {
        /// Number of questions
        expected: usize,
        /// Number of ground truth lists
        actual: usize,
    },
    /// A pipeline run covers a different number of questions than the batch
    #[error("Run has {answers} answers and {passages} passage lists for {expected} questions")]
    RunLength {
        /// Number of questions
        expected: usize,
        /// Number of answers in the run
        answers: usize,
        /// Number of passage lists in the run
        passages: usize,
    },
    /// Explicit rank list length differs from its identifier list
    #[error("Question {index} has {actual} ranks for {expected} ground truth passages")]
    RankLength {
        /// Position of the offending question
        index: usize,
        /// Number of ground truth identifiers
        expected: usize,
        /// Number of explicit ranks
        actual: usize,
    },
    /// The pipeline failed; the batch is aborted
    #[error("Pipeline failed on question {index}: {source}")]
    Pipeline {
        /// Position of the question being answered
        index: usize,
        /// Error reported by the pipeline
        #[source]
        source: BoxError,
    },
    /// Dataset could not be loaded or is inconsistent
    #[error("Dataset error: {0}")]
    Dataset(String),
}

/// Errors that can occur while configuring an embedding provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// Provider identifier is not in the known set
    #[error("Unknown embedding provider: {0}")]
    UnknownProvider(String),
    /// A credential the provider needs was not configured
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

impl From<EmbeddingError> for EvalError {
    fn from(err: EmbeddingError) -> Self {
        EvalError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_message_names_positions() {
        let err = EvalError::RaggedPassages {
            index: 3,
            expected: 5,
            actual: 4,
        };
        assert_eq!(err.to_string(), "Question 3 returned 4 passages, expected 5");
    }

    #[test]
    fn test_pipeline_error_keeps_source() {
        use std::error::Error;

        let source: BoxError = "connection reset".into();
        let err = EvalError::Pipeline { index: 1, source };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_embedding_error_converts_to_config() {
        let err: EvalError = EmbeddingError::MissingCredential("OPENAI_API_KEY").into();
        assert!(matches!(err, EvalError::Config(ref msg) if msg.contains("OPENAI_API_KEY")));
    }
}
