//! # fe-batch
//!
//! Batch orchestration for ForecastEval.
//!
//! A batch is an ordered list of evaluation tasks read from a YAML/JSON
//! configuration. [`BatchRunner`] drives each enabled task through
//! load → daily metrics → aggregation, isolates failures per task and returns
//! the ordered [`fe_core::BatchReport`] plus outcome counts.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Batch configuration file.
pub mod config;
/// Orchestrator.
pub mod runner;
/// Visualization hand-off.
pub mod sink;
/// Loader seam.
pub mod source;
/// Evaluation tasks.
pub mod task;

pub use config::{BatchConfig, LoadedConfig, TaskEntry, read_batch_config};
pub use runner::{BatchOutcome, BatchRunner, BatchSummary, TaskFailure, TaskRecord, TaskStatus};
pub use sink::{JsonExportSink, VisualizationHandoff, VisualizationSink};
pub use source::{FsLoader, TaskLoader};
pub use task::{EvaluationTask, PlannedTask};
