//! Output formatting for evaluation results.
//!
//! Supports both a human-readable terminal report and JSON for scripting.

use ragbench_core::evaluation::EvaluateResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum characters of a question shown in the per-question table
const QUESTION_MAX_LEN: usize = 60;

/// Full evaluation report
#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub dataset: DatasetInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<String>,
    pub metrics: Vec<MetricMean>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_query: Option<Vec<QueryResult>>,
}

/// Dataset summary
#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub num_questions: usize,
    /// Passages per question
    pub k: usize,
}

/// Mean score of one metric
#[derive(Debug, Serialize)]
pub struct MetricMean {
    pub name: String,
    pub mean: f64,
}

/// One question's row
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    pub passage_ids: Vec<String>,
    pub scores: BTreeMap<String, f64>,
}

impl EvalReport {
    /// Builds a report from an evaluation result.
    pub fn new(
        dataset_name: &str,
        embedding: Option<String>,
        result: &EvaluateResult,
        per_query: bool,
    ) -> Self {
        let table = &result.each_results;
        let metrics = result
            .use_metrics
            .iter()
            .filter_map(|name| {
                result.mean(name).map(|mean| MetricMean {
                    name: name.clone(),
                    mean,
                })
            })
            .collect();

        let per_query = per_query.then(|| {
            table
                .rows()
                .iter()
                .map(|row| QueryResult {
                    question: row.question.clone(),
                    answer: row.answer.clone(),
                    passage_ids: row.passages.iter().map(|p| p.id.to_key()).collect(),
                    scores: row.metrics.clone(),
                })
                .collect()
        });

        Self {
            dataset: DatasetInfo {
                name: dataset_name.to_string(),
                num_questions: table.len(),
                k: table.k(),
            },
            embedding,
            metrics,
            per_query,
        }
    }
}

/// Formats the report as JSON.
pub fn format_json(report: &EvalReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Formats the report for human-readable terminal output.
pub fn format_human(report: &EvalReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    out.push_str(&format!("\n{}\n", rule));
    out.push_str("RAG RETRIEVAL EVALUATION\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!(
        "\nDataset: {} ({} questions, k={})\n",
        report.dataset.name, report.dataset.num_questions, report.dataset.k
    ));
    if let Some(embedding) = &report.embedding {
        out.push_str(&format!("Embedding: {}\n", embedding));
    }

    out.push_str(&format!("\n{}\n", "-".repeat(70)));
    if report.metrics.is_empty() {
        out.push_str("No metrics computed (no applicable ground truth)\n");
    } else {
        out.push_str(&format!("{:<16} {:>10}\n", "Metric", "Mean"));
        for metric in &report.metrics {
            out.push_str(&format!("{:<16} {:>10.4}\n", metric.name, metric.mean));
        }
    }

    if let Some(rows) = &report.per_query {
        out.push_str(&format!("\n{}\n", "-".repeat(70)));
        out.push_str("PER-QUESTION RESULTS\n");
        for (i, row) in rows.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {}\n",
                i + 1,
                truncate_text(&row.question, QUESTION_MAX_LEN)
            ));
            out.push_str(&format!("   passages: {}\n", row.passage_ids.join(", ")));
            for metric in &report.metrics {
                if let Some(score) = row.scores.get(&metric.name) {
                    out.push_str(&format!("   {:<16} {:.4}\n", metric.name, score));
                }
            }
        }
    }

    out.push_str(&format!("{}\n", rule));
    out
}

/// Truncates text to a maximum length, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragbench_core::config::MetricSelection;
    use ragbench_core::evaluation::{calculate_metrics, GroundTruth, Pipeline};
    use ragbench_core::types::Passage;
    use std::convert::Infallible;

    struct Fixed;

    impl Pipeline for Fixed {
        type Error = Infallible;

        fn run(&mut self, question: &str) -> Result<(String, Vec<Passage>), Infallible> {
            Ok((
                format!("answer to {}", question),
                vec![Passage::new("p1", "one"), Passage::new("p2", "two")],
            ))
        }
    }

    fn make_result() -> EvaluateResult {
        let ground_truth = GroundTruth::unranked(vec![vec!["p1".into()], vec!["p3".into()]]);
        calculate_metrics(
            &MetricSelection::named(["Recall", "Precision"]),
            &["Q1", "Q2"],
            Fixed,
            Some(&ground_truth),
        )
        .unwrap()
    }

    #[test]
    fn test_report_summary() {
        let report = EvalReport::new("bench", None, &make_result(), false);
        assert_eq!(report.dataset.num_questions, 2);
        assert_eq!(report.dataset.k, 2);
        assert_eq!(report.metrics.len(), 2);
        assert_eq!(report.metrics[0].name, "Recall");
        assert!((report.metrics[0].mean - 0.5).abs() < 1e-9);
        assert!(report.per_query.is_none());
    }

    #[test]
    fn test_format_json() {
        let report = EvalReport::new("bench", Some("OpenAI m".to_string()), &make_result(), true);
        let json = format_json(&report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dataset"]["name"], "bench");
        assert_eq!(value["embedding"], "OpenAI m");
        assert_eq!(value["per_query"][0]["passage_ids"][0], "p1");
        assert_eq!(value["per_query"][1]["scores"]["Recall"], 0.0);
    }

    #[test]
    fn test_format_human() {
        let report = EvalReport::new("bench", None, &make_result(), true);
        let output = format_human(&report);
        assert!(output.contains("Dataset: bench (2 questions, k=2)"));
        assert!(output.contains("Precision"));
        assert!(output.contains("PER-QUESTION RESULTS"));
        assert!(output.contains("1. Q1"));

        // Rows follow the summary order, not alphabetical order
        let rows = &output[output.find("PER-QUESTION RESULTS").unwrap()..];
        let recall = rows.find("Recall").unwrap();
        let precision = rows.find("Precision").unwrap();
        assert!(recall < precision);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("this is a long question", 10), "this is...");
    }
}
