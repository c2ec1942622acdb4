//! # fe-viz
//!
//! Cross-task comparison artifacts for ForecastEval.
//!
//! This crate turns a [`fe_core::BatchReport`] into plot-friendly JSON
//! structures (arrays instead of nested objects) and a pivoted summary
//! table. Drawing is left to an external renderer.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Per-metric cumulative-over-days series, one per task.
pub mod cumulative;
/// Per-task daily metric series.
pub mod daily;
/// Artifact metadata.
pub mod meta;
/// Cross-task report assembly and writing.
pub mod report;
/// Pivoted summary table (JSON + CSV).
pub mod table;

pub use cumulative::{CumulativeArtifact, CumulativeSeries, cumulative_artifact};
pub use daily::{DailySeriesArtifact, daily_series_artifacts};
pub use meta::ArtifactMeta;
pub use report::{CrossTaskReport, cross_task_report, write_json};
pub use table::{SummaryTableArtifact, TableRow, summary_table_artifact};
