//! Batch orchestration.
//!
//! Tasks run strictly in order. Each enabled task is one unit
//! (load → score → aggregate); any error or panic inside the unit fails that
//! task only. Nothing is retried.

use std::panic::{AssertUnwindSafe, catch_unwind};

use fe_core::{BatchReport, Error, GridShape, TaskMetricSummary};
use fe_data::SourceSchema;
use fe_metrics::evaluate_samples;
use serde::Serialize;

use crate::sink::{VisualizationHandoff, VisualizationSink};
use crate::source::TaskLoader;
use crate::task::{EvaluationTask, PlannedTask};

/// Failure kind for a task whose source yielded no valid sample.
pub const NO_VALID_SAMPLES: &str = "no_valid_samples";

/// Failure kind for a panic caught at the task boundary.
pub const PANIC: &str = "panic";

/// Final state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Summary stored in the report.
    Succeeded,
    /// Absent from the report.
    Failed,
    /// Disabled; the loader was not invoked.
    Skipped,
}

/// Why a task failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    /// Task identifier.
    pub task_id: String,
    /// Stable error kind (`config`, `load`, `schema`, `no_valid_samples`, ...).
    pub kind: String,
    /// Human-readable cause.
    pub message: String,
}

/// Per-task line of the batch summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub status: TaskStatus,
    /// Valid samples scored (0 unless succeeded).
    pub samples: usize,
    /// Rows dropped by the loader.
    pub dropped_rows: usize,
}

/// Operator-visible batch totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub tasks: Vec<TaskRecord>,
    pub failures: Vec<TaskFailure>,
}

/// Result of a whole batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Summaries of succeeded tasks, in batch order.
    pub report: BatchReport,
    /// Totals, per-task records and failures.
    pub summary: BatchSummary,
}

impl BatchOutcome {
    /// `(succeeded, failed, skipped)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.summary.succeeded, self.summary.failed, self.summary.skipped)
    }
}

struct TaskSuccess {
    summary: TaskMetricSummary,
    samples: usize,
    dropped_rows: usize,
}

enum UnitError {
    Failed { error: Error, dropped_rows: usize },
    Empty { dropped_rows: usize, rows_read: usize },
}

/// Runs tasks through loader, metric engine and aggregator.
pub struct BatchRunner<L, S> {
    loader: L,
    sink: S,
    schema: SourceSchema,
    shape: GridShape,
}

impl<L: TaskLoader, S: VisualizationSink> BatchRunner<L, S> {
    /// Runner with the given seams, the default column names and grid shape.
    pub fn new(loader: L, sink: S) -> Self {
        Self { loader, sink, schema: SourceSchema::default(), shape: GridShape::default() }
    }

    /// Override the source column names.
    pub fn with_schema(mut self, schema: SourceSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Override the evaluation grid.
    pub fn with_shape(mut self, shape: GridShape) -> Self {
        self.shape = shape;
        self
    }

    /// Evaluation grid in use.
    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Run every planned task in order. Never fails as a whole.
    pub fn run(&self, plan: &[PlannedTask]) -> BatchOutcome {
        let mut report = BatchReport::new();
        let mut summary = BatchSummary {
            total: plan.len(),
            succeeded: 0,
            failed: 0,
            skipped: 0,
            tasks: Vec::with_capacity(plan.len()),
            failures: Vec::new(),
        };

        tracing::info!(tasks = plan.len(), "batch started");
        for planned in plan {
            let task_id = planned.task_id().to_string();
            let record = |status, samples, dropped_rows| TaskRecord { task_id: task_id.clone(), status, samples, dropped_rows };

            if !planned.enabled() {
                tracing::info!(task_id = %task_id, "task disabled; skipped");
                summary.skipped += 1;
                summary.tasks.push(record(TaskStatus::Skipped, 0, 0));
                continue;
            }

            let task = match planned {
                PlannedTask::Ready(task) => task,
                PlannedTask::Invalid { error, .. } => {
                    tracing::error!(task_id = %task_id, kind = error.kind(), error = %error, "task configuration invalid");
                    summary.failed += 1;
                    summary.tasks.push(record(TaskStatus::Failed, 0, 0));
                    summary.failures.push(TaskFailure {
                        task_id: task_id.clone(),
                        kind: error.kind().to_string(),
                        message: error.to_string(),
                    });
                    continue;
                }
            };

            tracing::info!(task_id = %task_id, model_type = %task.model_type, source = %task.data_source.display(), "task started");
            let unit = catch_unwind(AssertUnwindSafe(|| self.run_task(task)));

            let failure = match unit {
                Ok(Ok(ok)) => {
                    tracing::info!(task_id = %task_id, samples = ok.samples, days = ok.summary.horizon(), "task succeeded");
                    match report.insert(task_id.clone(), task.model_type, ok.summary) {
                        Ok(()) => {
                            summary.succeeded += 1;
                            summary.tasks.push(record(TaskStatus::Succeeded, ok.samples, ok.dropped_rows));
                            continue;
                        }
                        Err(e) => (e.kind().to_string(), e.to_string(), ok.dropped_rows),
                    }
                }
                Ok(Err(UnitError::Failed { error, dropped_rows })) => {
                    (error.kind().to_string(), error.to_string(), dropped_rows)
                }
                Ok(Err(UnitError::Empty { dropped_rows, rows_read })) => (
                    NO_VALID_SAMPLES.to_string(),
                    format!("no valid samples ({rows_read} rows read, {dropped_rows} dropped)"),
                    dropped_rows,
                ),
                Err(payload) => (PANIC.to_string(), panic_message(payload.as_ref()), 0),
            };

            let (kind, message, dropped_rows) = failure;
            tracing::error!(task_id = %task_id, kind = %kind, error = %message, "task failed");
            summary.failed += 1;
            summary.tasks.push(record(TaskStatus::Failed, 0, dropped_rows));
            summary.failures.push(TaskFailure { task_id: task_id.clone(), kind, message });
        }

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch finished"
        );
        BatchOutcome { report, summary }
    }

    fn run_task(&self, task: &EvaluationTask) -> std::result::Result<TaskSuccess, UnitError> {
        let outcome = self
            .loader
            .load(task, &self.schema, &self.shape)
            .map_err(|error| UnitError::Failed { error, dropped_rows: 0 })?;
        let dropped_rows = outcome.diagnostics.dropped.len();
        let rows_read = outcome.diagnostics.rows_read;

        let evaluation =
            evaluate_samples(outcome.samples).map_err(|error| UnitError::Failed { error, dropped_rows })?;
        let samples = evaluation.samples;
        let Some(summary) = evaluation.summary else {
            return Err(UnitError::Empty { dropped_rows, rows_read });
        };

        if let Some((sample, sample_metrics)) = &evaluation.first {
            let handoff = VisualizationHandoff {
                task,
                sample,
                sample_metrics,
                summary: &summary,
                highlight_day: task.highlight_day,
            };
            if let Err(e) = self.sink.hand_off(&handoff) {
                tracing::warn!(task_id = %task.task_id, error = %e, "visualization hand-off failed");
            }
        }

        Ok(TaskSuccess { summary, samples, dropped_rows })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
