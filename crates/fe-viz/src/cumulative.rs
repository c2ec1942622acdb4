//! Cumulative-over-days comparison series (numbers-first).
//!
//! For each metric kind there is one artifact with one running-sum series per
//! task, tasks in batch order. Tasks whose summary does not cover the full
//! horizon are listed in `incomplete` instead.

use fe_core::types::nan_as_null;
use fe_core::{BatchReport, MetricKind, ModelType, Result};
use serde::Serialize;

use crate::meta::ArtifactMeta;

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeArtifact {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub metric: MetricKind,
    pub metric_label: String,
    /// Day numbers, 1-based.
    pub days: Vec<usize>,
    pub series: Vec<CumulativeSeries>,
    /// Tasks left out because their summary is shorter than the horizon.
    pub incomplete: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeSeries {
    pub task_id: String,
    pub model_type: ModelType,
    #[serde(with = "nan_as_null")]
    pub cumulative: Vec<f64>,
}

/// Running sum of `values`; a NaN carries through every later day.
pub fn running_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

pub fn cumulative_artifact(
    report: &BatchReport,
    kind: MetricKind,
    horizon_days: usize,
) -> Result<CumulativeArtifact> {
    let mut series = Vec::with_capacity(report.len());
    let mut incomplete = Vec::new();

    for task in report {
        match task.metrics.full_series(kind, horizon_days) {
            Some(values) => series.push(CumulativeSeries {
                task_id: task.task_id.clone(),
                model_type: task.model_type,
                cumulative: running_sum(values),
            }),
            None => {
                tracing::warn!(
                    task_id = %task.task_id,
                    metric = kind.key(),
                    days = task.metrics.horizon(),
                    horizon_days,
                    "incomplete horizon; task left out of cumulative series"
                );
                incomplete.push(task.task_id.clone());
            }
        }
    }

    Ok(CumulativeArtifact {
        schema_version: "forecast_eval_cumulative_v0".to_string(),
        meta: ArtifactMeta::now()?,
        metric: kind,
        metric_label: kind.label().to_string(),
        days: (1..=horizon_days).collect(),
        series,
        incomplete,
    })
}
