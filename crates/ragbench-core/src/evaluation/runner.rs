//! Sequential pipeline execution over a question batch.
//!
//! [`run_pipeline`] calls the pipeline once per question, in input order,
//! and reports progress after every call. The first pipeline failure aborts
//! the batch; no partial results are returned.

use crate::error::EvalError;
use crate::types::Passage;
use instant::Instant;
use tracing::{debug, instrument};

/// A question-answering pipeline under evaluation.
///
/// Every call in one evaluation batch must return the same number of
/// passages.
pub trait Pipeline {
    /// Error reported when a question cannot be answered.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Answers `question`, returning the answer and its supporting passages
    /// in retrieval order.
    fn run(&mut self, question: &str) -> Result<(String, Vec<Passage>), Self::Error>;
}

impl<P: Pipeline + ?Sized> Pipeline for &mut P {
    type Error = P::Error;

    fn run(&mut self, question: &str) -> Result<(String, Vec<Passage>), Self::Error> {
        (**self).run(question)
    }
}

/// Answers and passages collected from a pipeline, aligned with the input
/// questions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRun {
    /// `answers[i]` answers question `i`
    pub answers: Vec<String>,
    /// `passages[i]` supports `answers[i]`
    pub passages: Vec<Vec<Passage>>,
}

/// Progress of a pipeline batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    /// Questions answered so far
    pub completed: usize,
    /// Questions in the batch
    pub total: usize,
    /// Time elapsed since the batch started (milliseconds)
    pub elapsed_ms: u64,
}

impl RunProgress {
    /// Creates a new progress instance.
    pub fn new(completed: usize, total: usize, elapsed_ms: u64) -> Self {
        Self {
            completed,
            total,
            elapsed_ms,
        }
    }

    /// Returns the completion percentage (0.0 to 100.0).
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Returns true if every question has been answered.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Returns estimated time remaining in milliseconds, if computable.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        if self.completed == 0 || self.completed >= self.total {
            return None;
        }
        let remaining = self.total - self.completed;
        let ms_per_question = self.elapsed_ms / self.completed as u64;
        Some(remaining as u64 * ms_per_question)
    }
}

/// Helper for tracking elapsed time during a batch.
pub struct ProgressTimer {
    start: Instant,
}

impl ProgressTimer {
    /// Creates a new timer starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for ProgressTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `pipeline` over `questions` in order.
///
/// `on_progress` is called once before the first question and after each
/// answered question.
#[instrument(skip_all, fields(questions = questions.len()))]
pub fn run_pipeline<P, S, F>(
    questions: &[S],
    mut pipeline: P,
    mut on_progress: F,
) -> Result<PipelineRun, EvalError>
where
    P: Pipeline,
    S: AsRef<str>,
    F: FnMut(RunProgress),
{
    let timer = ProgressTimer::new();
    let total = questions.len();
    let mut run = PipelineRun {
        answers: Vec::with_capacity(total),
        passages: Vec::with_capacity(total),
    };

    on_progress(RunProgress::new(0, total, 0));

    for (index, question) in questions.iter().enumerate() {
        let (answer, passages) =
            pipeline
                .run(question.as_ref())
                .map_err(|e| EvalError::Pipeline {
                    index,
                    source: Box::new(e),
                })?;

        debug!(
            "Question {} answered with {} passages",
            index,
            passages.len()
        );

        run.answers.push(answer);
        run.passages.push(passages);
        on_progress(RunProgress::new(index + 1, total, timer.elapsed_ms()));
    }

    Ok(run)
}
