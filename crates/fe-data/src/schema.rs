//! Column names of a model-result source.

use serde::{Deserialize, Serialize};

/// Names of the columns the loader reads.
///
/// Ground truth and prediction are required; everything else is optional and
/// only used when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSchema {
    /// Ground-truth matrix column.
    pub ground_truth: String,
    /// Prediction matrix column.
    pub prediction: String,
    /// Latitude grid column.
    pub lat: String,
    /// Longitude grid column.
    pub lon: String,
    /// Full timestamp column.
    pub timestamp: String,
    /// Date-only column, used to derive the timestamp when `timestamp` is absent.
    pub date: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            ground_truth: "y_rol".to_string(),
            prediction: "y_rol_pred".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            timestamp: "data".to_string(),
            date: "dia_mes_ano".to_string(),
        }
    }
}
