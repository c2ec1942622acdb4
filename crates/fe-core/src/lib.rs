//! # fe-core
//!
//! Shared domain types for ForecastEval.
//!
//! Every other crate in the workspace depends on this one for:
//! - the evaluation grid constants ([`GRID_POINTS`], [`HORIZON_DAYS`]) and [`GridShape`]
//! - model and metric identifiers ([`ModelType`], [`MetricKind`])
//! - the per-task metric summary ([`TaskMetricSummary`]) and the ordered [`BatchReport`]
//! - the error taxonomy ([`Error`])

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Evaluation grid constants and shape validation.
pub mod domain;
/// Error types.
pub mod error;
/// Ordered per-task batch report.
pub mod report;
/// Model, metric and summary types.
pub mod types;

pub use domain::{GRID_POINTS, GridShape, HORIZON_DAYS};
pub use error::{Error, Result};
pub use report::{BatchReport, TaskReport};
pub use types::{MetricKind, ModelType, TaskMetricSummary};

/// Workspace version, stamped into every artifact.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name, stamped into every artifact.
pub const TOOL_NAME: &str = "forecast-eval";
