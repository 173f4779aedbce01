//! # ragbench Core
//!
//! Retrieval quality evaluation for retrieval-augmented generation pipelines.
//!
//! Given a set of questions, a pipeline that answers them with supporting
//! passages, and optional ground truth, this crate computes information
//! retrieval metrics per question and in aggregate.
//!
//! ## Modules
//!
//! - [`evaluation`] - Metric registry, pipeline runner, result table and evaluators
//! - [`config`] - Metric selection and evaluator settings
//! - [`types`] - Passages and passage identifiers
//! - [`embedding`] - Embedding provider selection
//! - [`error`] - Error types for evaluation and embedding configuration

pub mod config;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod types;

pub use error::{EmbeddingError, EvalError};
