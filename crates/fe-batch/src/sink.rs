//! Visualization hand-off.
//!
//! After a task succeeds the runner passes exactly one selected sample, its
//! daily metrics and the highlight day to a [`VisualizationSink`]. Rendering
//! is external; the default sink exports the data as JSON.

use std::path::PathBuf;

use fe_core::types::nan_as_null;
use fe_core::{ModelType, Result, TaskMetricSummary};
use fe_data::SampleRecord;
use fe_metrics::DailyMetrics;
use fe_viz::{ArtifactMeta, write_json};
use serde::Serialize;

use crate::task::EvaluationTask;

/// Everything the visualization collaborator receives for one task.
#[derive(Debug, Clone, Copy)]
pub struct VisualizationHandoff<'a> {
    /// The succeeded task.
    pub task: &'a EvaluationTask,
    /// Selected sample (the first valid one).
    pub sample: &'a SampleRecord,
    /// Daily metrics of the selected sample.
    pub sample_metrics: &'a DailyMetrics,
    /// Task summary.
    pub summary: &'a TaskMetricSummary,
    /// Day to highlight (0-based).
    pub highlight_day: usize,
}

/// Receives the visualization hand-off of every succeeded task.
///
/// Errors are logged by the runner and never change the task outcome.
pub trait VisualizationSink {
    /// Accept one hand-off.
    fn hand_off(&self, handoff: &VisualizationHandoff<'_>) -> Result<()>;
}

impl<T: VisualizationSink + ?Sized> VisualizationSink for &T {
    fn hand_off(&self, handoff: &VisualizationHandoff<'_>) -> Result<()> {
        (**self).hand_off(handoff)
    }
}

/// Writes `sample.json` and `daily_metrics.json` into the task's output
/// directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExportSink;

#[derive(Debug, Serialize)]
struct SampleArtifact<'a> {
    schema_version: &'static str,
    meta: ArtifactMeta,
    task_id: &'a str,
    model_type: ModelType,
    row: usize,
    timestamp: Option<String>,
    highlight_day: usize,
    grid_points: usize,
    horizon: usize,
    /// `[day][grid_point]`
    ground_truth: Vec<Vec<f64>>,
    prediction: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<CoordinatesOut<'a>>,
    metrics: SampleMetricsOut<'a>,
}

#[derive(Debug, Serialize)]
struct CoordinatesOut<'a> {
    lat: &'a [f64],
    lat_shape: &'a [usize],
    lon: &'a [f64],
    lon_shape: &'a [usize],
}

#[derive(Debug, Serialize)]
struct SampleMetricsOut<'a> {
    #[serde(serialize_with = "nan_as_null::serialize")]
    squared_error: &'a [f64],
    #[serde(serialize_with = "nan_as_null::serialize")]
    rmse: &'a [f64],
    #[serde(serialize_with = "nan_as_null::serialize")]
    r2: &'a [f64],
}

#[derive(Debug, Serialize)]
struct TaskMetricsArtifact<'a> {
    schema_version: &'static str,
    meta: ArtifactMeta,
    task_id: &'a str,
    model_type: ModelType,
    days: Vec<usize>,
    metrics: &'a TaskMetricSummary,
}

impl VisualizationSink for JsonExportSink {
    fn hand_off(&self, h: &VisualizationHandoff<'_>) -> Result<()> {
        let dir: &PathBuf = &h.task.output_target;
        std::fs::create_dir_all(dir)?;

        let s = h.sample;
        let sample = SampleArtifact {
            schema_version: "forecast_eval_sample_v0",
            meta: ArtifactMeta::now()?,
            task_id: &h.task.task_id,
            model_type: h.task.model_type,
            row: s.row,
            timestamp: s.timestamp.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            highlight_day: h.highlight_day,
            grid_points: s.grid_points(),
            horizon: s.horizon(),
            ground_truth: (0..s.horizon()).map(|d| s.ground_truth_day(d)).collect(),
            prediction: (0..s.horizon()).map(|d| s.prediction_day(d)).collect(),
            coordinates: s.coordinates.as_ref().map(|c| CoordinatesOut {
                lat: &c.lat,
                lat_shape: &c.lat_shape,
                lon: &c.lon,
                lon_shape: &c.lon_shape,
            }),
            metrics: SampleMetricsOut {
                squared_error: &h.sample_metrics.squared_error,
                rmse: &h.sample_metrics.rmse,
                r2: &h.sample_metrics.r2,
            },
        };
        write_json(&dir.join("sample.json"), &sample)?;

        let daily = TaskMetricsArtifact {
            schema_version: "forecast_eval_task_metrics_v0",
            meta: ArtifactMeta::now()?,
            task_id: &h.task.task_id,
            model_type: h.task.model_type,
            days: (1..=h.summary.horizon()).collect(),
            metrics: h.summary,
        };
        write_json(&dir.join("daily_metrics.json"), &daily)?;

        tracing::debug!(task_id = %h.task.task_id, dir = %dir.display(), "visualization hand-off exported");
        Ok(())
    }
}
