//! Day-wise metrics of a single sample.

use fe_core::{Error, MetricKind, Result};
use fe_data::SampleRecord;
use nalgebra::{DMatrix, DVectorView};
use serde::Serialize;

/// Metric vectors of one sample, one value per forecast day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMetrics {
    /// Mean over grid points of the squared error.
    pub squared_error: Vec<f64>,
    /// `sqrt(squared_error)`.
    pub rmse: Vec<f64>,
    /// Coefficient of determination; NaN when the day's ground truth is constant.
    pub r2: Vec<f64>,
}

impl DailyMetrics {
    /// Number of days.
    pub fn horizon(&self) -> usize {
        self.rmse.len()
    }

    /// Series for one metric kind (`Mse` is the squared error series).
    pub fn series(&self, kind: MetricKind) -> &[f64] {
        match kind {
            MetricKind::Rmse => &self.rmse,
            MetricKind::R2 => &self.r2,
            MetricKind::Mse => &self.squared_error,
        }
    }
}

/// Squared error and R² of one day.
///
/// Returns `(mean squared error, r2)`; `r2` is NaN when the ground truth has
/// zero variance.
pub fn day_metrics(truth: DVectorView<'_, f64>, pred: DVectorView<'_, f64>) -> (f64, f64) {
    let n = truth.len() as f64;
    let ss_res = (&truth - &pred).norm_squared();
    let first = truth[0];
    // A constant day has no variance; the mean-centred sum would only see rounding noise.
    let r2 = if truth.iter().all(|&y| y == first) {
        f64::NAN
    } else {
        let mean = truth.mean();
        let ss_tot: f64 = truth.iter().map(|&y| (y - mean) * (y - mean)).sum();
        1.0 - ss_res / ss_tot
    };
    (ss_res / n, r2)
}

/// Metrics of a ground-truth / prediction pair of equal shape.
pub fn daily_metrics_of(truth: &DMatrix<f64>, pred: &DMatrix<f64>) -> Result<DailyMetrics> {
    if truth.shape() != pred.shape() {
        return Err(Error::Validation(format!(
            "ground truth is {:?} but prediction is {:?}",
            truth.shape(),
            pred.shape()
        )));
    }
    if truth.nrows() == 0 || truth.ncols() == 0 {
        return Err(Error::Validation("cannot score an empty matrix".into()));
    }

    let h = truth.ncols();
    let mut out = DailyMetrics {
        squared_error: Vec::with_capacity(h),
        rmse: Vec::with_capacity(h),
        r2: Vec::with_capacity(h),
    };
    for d in 0..h {
        let (se, r2) = day_metrics(truth.column(d), pred.column(d));
        out.squared_error.push(se);
        out.rmse.push(se.sqrt());
        out.r2.push(r2);
    }
    Ok(out)
}

/// Metrics of a validated sample.
pub fn daily_metrics(sample: &SampleRecord) -> Result<DailyMetrics> {
    daily_metrics_of(&sample.ground_truth, &sample.prediction)
}
