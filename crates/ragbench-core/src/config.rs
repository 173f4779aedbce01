//! Evaluation configuration.
//!
//! This module holds the constants shared by the evaluation engine and the
//! serializable [`EvaluatorConfig`] that front ends deserialize and turn into
//! a validated [`MetricSelection`].
//!
//! # Usage
//!
//! ```
//! use ragbench_core::config::EvaluatorConfig;
//!
//! let config: EvaluatorConfig =
//!     serde_json::from_str(r#"{"run_all": false, "metrics": ["Recall", "ndcg"]}"#).unwrap();
//! let selection = config.into_selection().unwrap();
//! assert_eq!(selection.metric_names(), ["Recall", "ndcg"]);
//! ```

use crate::error::EvalError;
use crate::evaluation::registry::MatchMode;
use serde::{Deserialize, Serialize};

// =============================================================================
// Metric Selection
// =============================================================================

/// Metric names selected when every metric is requested.
///
/// Order determines the column order of the result table.
pub const ALL_METRIC_NAMES: &[&str] = &[
    "AP",
    "NDCG",
    "CG",
    "Ind_DCG",
    "DCG",
    "Ind_IDCG",
    "IDCG",
    "Recall",
    "Precision",
    "RR",
    "Hole",
    "TopK_Accuracy",
    "EM",
    "F1_score",
];

// =============================================================================
// Scoring
// =============================================================================

/// Relevance score given to every retrieved passage by the default scorer.
pub const PLACEHOLDER_RELEVANCE_SCORE: f64 = 1.0;

// =============================================================================
// Evaluator Configuration
// =============================================================================

/// User-facing evaluator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Select every known metric, ignoring `metrics`
    #[serde(default = "default_run_all")]
    pub run_all: bool,
    /// Explicit metric names, required when `run_all` is false
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    /// Skip unknown metric names instead of failing
    #[serde(default)]
    pub lenient: bool,
}

fn default_run_all() -> bool {
    true
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            run_all: true,
            metrics: None,
            lenient: false,
        }
    }
}

impl EvaluatorConfig {
    /// Validates the settings into a metric selection.
    pub fn into_selection(self) -> Result<MetricSelection, EvalError> {
        let mode = if self.lenient {
            MatchMode::Lenient
        } else {
            MatchMode::Strict
        };
        MetricSelection::new(self.run_all, self.metrics).map(|s| s.with_mode(mode))
    }
}

/// The validated set of metric names an evaluation should compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSelection {
    names: Vec<String>,
    mode: MatchMode,
}

impl MetricSelection {
    /// Builds a selection.
    ///
    /// With `run_all` every name in [`ALL_METRIC_NAMES`] is selected. Otherwise
    /// `metrics` must be present; its absence is a configuration error.
    pub fn new(run_all: bool, metrics: Option<Vec<String>>) -> Result<Self, EvalError> {
        let names = if run_all {
            ALL_METRIC_NAMES.iter().map(|s| s.to_string()).collect()
        } else {
            metrics.ok_or_else(|| {
                EvalError::Config("metrics must be given when run_all is false".to_string())
            })?
        };
        Ok(Self {
            names,
            mode: MatchMode::Strict,
        })
    }

    /// Selects every known metric.
    pub fn all() -> Self {
        Self {
            names: ALL_METRIC_NAMES.iter().map(|s| s.to_string()).collect(),
            mode: MatchMode::Strict,
        }
    }

    /// Selects the given metric names.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            mode: MatchMode::Strict,
        }
    }

    /// Sets how unmatched names are handled.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Requested metric names, in request order.
    pub fn metric_names(&self) -> &[String] {
        &self.names
    }

    /// Unknown-name handling.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}
