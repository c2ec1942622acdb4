//! # fe-metrics
//!
//! Forecast accuracy metrics for ForecastEval.
//!
//! [`daily`] computes, for one sample and each forecast day, the mean squared
//! error, RMSE and R² over all grid points. [`aggregate`] averages those
//! per-sample vectors into a [`fe_core::TaskMetricSummary`]; [`evaluate_samples`]
//! does both for a task's samples.
//!
//! Undefined values (R² of a constant ground-truth day) are NaN, never
//! errors, and NaN propagates through the mean.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Per-task mean of daily metric vectors.
pub mod aggregate;
/// Per-sample, per-day metrics.
pub mod daily;

pub use aggregate::{MetricAccumulator, SampleEvaluation, evaluate_samples};
pub use daily::{DailyMetrics, daily_metrics, daily_metrics_of, day_metrics};
