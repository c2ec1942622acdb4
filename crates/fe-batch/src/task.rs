//! Evaluation tasks.

use std::path::PathBuf;

use fe_core::{Error, ModelType};
use serde::Serialize;

/// One model-evaluation unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationTask {
    /// Unique task identifier.
    pub task_id: String,
    /// Model architecture.
    pub model_type: ModelType,
    /// Model-result source.
    pub data_source: PathBuf,
    /// Directory the visualization hand-off writes into.
    pub output_target: PathBuf,
    /// Disabled tasks are skipped without touching their source.
    pub enabled: bool,
    /// Day the visualization collaborator should highlight (0-based).
    pub highlight_day: usize,
}

/// A configuration entry after validation.
#[derive(Debug)]
pub enum PlannedTask {
    /// Ready to run (or to be skipped when disabled).
    Ready(EvaluationTask),
    /// The entry could not be turned into a task.
    Invalid {
        /// Task id, or `task[<index>]` when the entry has none.
        task_id: String,
        /// Whether the entry asked to be run.
        enabled: bool,
        /// Why validation failed.
        error: Error,
    },
}

impl PlannedTask {
    /// Identifier used in logs and summaries.
    pub fn task_id(&self) -> &str {
        match self {
            PlannedTask::Ready(t) => &t.task_id,
            PlannedTask::Invalid { task_id, .. } => task_id,
        }
    }

    /// Whether the entry is enabled.
    pub fn enabled(&self) -> bool {
        match self {
            PlannedTask::Ready(t) => t.enabled,
            PlannedTask::Invalid { enabled, .. } => *enabled,
        }
    }
}

impl From<EvaluationTask> for PlannedTask {
    fn from(task: EvaluationTask) -> Self {
        PlannedTask::Ready(task)
    }
}
