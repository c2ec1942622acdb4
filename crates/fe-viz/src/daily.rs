//! Per-task daily metric series, one artifact per task.

use fe_core::types::nan_as_null;
use fe_core::{BatchReport, ModelType, Result};
use serde::Serialize;

use crate::meta::ArtifactMeta;

#[derive(Debug, Clone, Serialize)]
pub struct DailySeriesArtifact {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub task_id: String,
    pub model_type: ModelType,
    /// Day numbers, 1-based.
    pub days: Vec<usize>,
    #[serde(with = "nan_as_null")]
    pub rmse: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub r2: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub mse: Vec<f64>,
}

/// One artifact per task, in batch order, covering each task's own horizon.
pub fn daily_series_artifacts(report: &BatchReport) -> Result<Vec<DailySeriesArtifact>> {
    let meta = ArtifactMeta::now()?;
    Ok(report
        .iter()
        .map(|t| DailySeriesArtifact {
            schema_version: "forecast_eval_daily_series_v0".to_string(),
            meta: meta.clone(),
            task_id: t.task_id.clone(),
            model_type: t.model_type,
            days: (1..=t.metrics.horizon()).collect(),
            rmse: t.metrics.rmse.clone(),
            r2: t.metrics.r2.clone(),
            mse: t.metrics.mse.clone(),
        })
        .collect())
}
