//! Validated per-sample records.

use chrono::NaiveDateTime;
use nalgebra::DMatrix;

/// Coordinate grids of a sample, flattened row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    /// Latitude values.
    pub lat: Vec<f64>,
    /// Nesting shape of the latitude cell (`[n]` or `[rows, cols]`).
    pub lat_shape: Vec<usize>,
    /// Longitude values.
    pub lon: Vec<f64>,
    /// Nesting shape of the longitude cell.
    pub lon_shape: Vec<usize>,
}

/// One forecast sample after coercion and truncation.
///
/// `ground_truth` and `prediction` always share their shape: `grid_points`
/// rows and the same number (≥ 1) of day columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Source row index.
    pub row: usize,
    /// Observed values, `grid_points × horizon`.
    pub ground_truth: DMatrix<f64>,
    /// Forecast values, same shape as `ground_truth`.
    pub prediction: DMatrix<f64>,
    /// Coordinate grids, when the source carries them.
    pub coordinates: Option<Coordinates>,
    /// Sample timestamp, when one could be resolved.
    pub timestamp: Option<NaiveDateTime>,
}

impl SampleRecord {
    /// Number of forecast days.
    pub fn horizon(&self) -> usize {
        self.ground_truth.ncols()
    }

    /// Number of grid points.
    pub fn grid_points(&self) -> usize {
        self.ground_truth.nrows()
    }

    /// Ground-truth values of one day over all grid points.
    pub fn ground_truth_day(&self, day: usize) -> Vec<f64> {
        self.ground_truth.column(day).iter().copied().collect()
    }

    /// Predicted values of one day over all grid points.
    pub fn prediction_day(&self, day: usize) -> Vec<f64> {
        self.prediction.column(day).iter().copied().collect()
    }
}
