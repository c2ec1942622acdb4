//! Common data types for ForecastEval

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Forecasting model architecture under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Fully-connected network
    #[serde(rename = "FCNN", alias = "fcnn")]
    Fcnn,
    /// Long short-term memory network
    #[serde(rename = "LSTM", alias = "lstm")]
    Lstm,
    /// Graph neural network
    #[serde(rename = "GNN", alias = "gnn")]
    Gnn,
}

impl ModelType {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Fcnn => "FCNN",
            ModelType::Lstm => "LSTM",
            ModelType::Gnn => "GNN",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FCNN" => Ok(ModelType::Fcnn),
            "LSTM" => Ok(ModelType::Lstm),
            "GNN" => Ok(ModelType::Gnn),
            _ => Err(Error::Config(format!(
                "invalid model_type '{raw}'; expected one of: FCNN, LSTM, GNN"
            ))),
        }
    }
}

/// Day-wise metric kinds, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Root mean squared error over grid points
    Rmse,
    /// Coefficient of determination over grid points
    R2,
    /// Mean squared error over grid points
    Mse,
}

impl MetricKind {
    /// All kinds in report order (RMSE, R², MSE).
    pub const ALL: [MetricKind; 3] = [MetricKind::Rmse, MetricKind::R2, MetricKind::Mse];

    /// Key used in serialized summaries and artifact file names.
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Rmse => "rmse",
            MetricKind::R2 => "r2",
            MetricKind::Mse => "mse",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Rmse => "RMSE",
            MetricKind::R2 => "R²",
            MetricKind::Mse => "MSE",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-day means of every metric over all valid samples of one task.
///
/// All three series always have the same, non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetricSummary {
    /// Mean RMSE per day
    #[serde(with = "nan_as_null")]
    pub rmse: Vec<f64>,
    /// Mean R² per day (NaN marks an undefined day)
    #[serde(with = "nan_as_null")]
    pub r2: Vec<f64>,
    /// Mean squared error per day
    #[serde(with = "nan_as_null")]
    pub mse: Vec<f64>,
}

impl TaskMetricSummary {
    /// Build a summary, rejecting empty or mismatched series.
    pub fn new(rmse: Vec<f64>, r2: Vec<f64>, mse: Vec<f64>) -> Result<Self> {
        if rmse.is_empty() {
            return Err(Error::Validation("metric summary must cover at least one day".into()));
        }
        if r2.len() != rmse.len() || mse.len() != rmse.len() {
            return Err(Error::Validation(format!(
                "metric series length mismatch: rmse={}, r2={}, mse={}",
                rmse.len(),
                r2.len(),
                mse.len()
            )));
        }
        Ok(Self { rmse, r2, mse })
    }

    /// Number of days covered.
    pub fn horizon(&self) -> usize {
        self.rmse.len()
    }

    /// Series for one metric kind.
    pub fn series(&self, kind: MetricKind) -> &[f64] {
        match kind {
            MetricKind::Rmse => &self.rmse,
            MetricKind::R2 => &self.r2,
            MetricKind::Mse => &self.mse,
        }
    }

    /// Series for one metric kind, only if it covers the full `horizon_days`.
    ///
    /// Longer series are cut to `horizon_days`.
    pub fn full_series(&self, kind: MetricKind, horizon_days: usize) -> Option<&[f64]> {
        let s = self.series(kind);
        (s.len() >= horizon_days).then(|| &s[..horizon_days])
    }
}

/// Serde adapter for float series: NaN is written as `null` and read back as NaN.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize, mapping NaN to `null`.
    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|x| if x.is_nan() { None } else { Some(*x) }))
    }

    /// Deserialize, mapping `null` to NaN.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
    }
}
