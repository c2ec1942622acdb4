//! Evaluation grid constants.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Latitude cells of the evaluation domain.
pub const GRID_LAT_CELLS: usize = 354;

/// Longitude cells of the evaluation domain.
pub const GRID_LON_CELLS: usize = 360;

/// Number of spatial grid points one day of a sample is flattened over.
pub const GRID_POINTS: usize = GRID_LAT_CELLS * GRID_LON_CELLS;

/// Number of forecast lookahead days every model is evaluated on.
pub const HORIZON_DAYS: usize = 7;

/// Shape every per-sample matrix is reshaped to: `grid_points` rows, up to
/// `horizon_days` columns.
///
/// Defaults to [`GRID_POINTS`] × [`HORIZON_DAYS`]. Every component takes the
/// shape from here instead of repeating the literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridShape {
    /// Rows per matrix (spatial cells).
    pub grid_points: usize,
    /// Maximum columns per matrix (forecast days).
    pub horizon_days: usize,
}

impl Default for GridShape {
    fn default() -> Self {
        Self { grid_points: GRID_POINTS, horizon_days: HORIZON_DAYS }
    }
}

impl GridShape {
    /// Build a shape, rejecting empty dimensions.
    pub fn new(grid_points: usize, horizon_days: usize) -> Result<Self> {
        let shape = Self { grid_points, horizon_days };
        shape.validate()?;
        Ok(shape)
    }

    /// Reject zero-sized dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.grid_points == 0 {
            return Err(Error::Validation("grid_points must be >= 1".to_string()));
        }
        if self.horizon_days == 0 {
            return Err(Error::Validation("horizon_days must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Check a 0-based day index against the horizon.
    pub fn check_day(&self, day: usize) -> Result<()> {
        if day >= self.horizon_days {
            return Err(Error::Validation(format!(
                "day index {day} out of range (0 <= day < {})",
                self.horizon_days
            )));
        }
        Ok(())
    }

    /// Infer the horizon of a flat row-major buffer of `len` values.
    ///
    /// Returns `None` when `len` is not a whole number of days or exceeds the
    /// horizon.
    pub fn horizon_of_flat_len(&self, len: usize) -> Option<usize> {
        if len == 0 || len % self.grid_points != 0 {
            return None;
        }
        let h = len / self.grid_points;
        (h <= self.horizon_days).then_some(h)
    }
}
