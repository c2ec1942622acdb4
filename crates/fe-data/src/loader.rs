//! Model-result loading and validation.

use std::path::{Path, PathBuf};

use fe_core::{Error, GridShape, Result};
use serde::Serialize;

use crate::cell::Cell;
use crate::matrix::{ReshapeError, coerce_matrix, flatten_numeric};
use crate::parquet_source::read_parquet_table;
use crate::sample::{Coordinates, SampleRecord};
use crate::schema::SourceSchema;
use crate::table::{Column, ResultTable};
use crate::timestamp::TimestampSource;

/// A row that was removed during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    /// Source row index.
    pub row: usize,
    /// Column whose cell failed.
    pub column: String,
    /// Human-readable cause.
    pub reason: String,
}

/// What happened while loading one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadDiagnostics {
    /// Source path (or a label for in-memory tables).
    pub source: String,
    /// Rows in the source table.
    pub rows_read: usize,
    /// Rows removed by coercion / reshape failures.
    pub dropped: Vec<DroppedRow>,
    /// Rows whose ground truth and prediction were cut to a common horizon.
    pub truncated_rows: usize,
    /// Rows without a usable timestamp (only counted when a source column exists).
    pub missing_timestamps: usize,
    /// Column names renamed by whitespace normalization.
    pub renamed_columns: usize,
    /// Where timestamps came from.
    pub timestamp_source: TimestampSource,
}

/// Result of a successful load. `samples` may be empty.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Valid samples in source order.
    pub samples: Vec<SampleRecord>,
    /// Load diagnostics.
    pub diagnostics: LoadDiagnostics,
}

impl LoadOutcome {
    /// `true` when no row survived validation.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Source encodings understood by [`load_samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON records or columns
    Json,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Pick the format from the file extension (`.parquet` / `.pq` → Parquet).
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "parquet" | "pq" => SourceFormat::Parquet,
            _ => SourceFormat::Json,
        }
    }
}

/// Read a source file into a table without validating it.
pub fn read_table(path: &Path) -> Result<ResultTable> {
    if !path.exists() {
        return Err(Error::Load(format!("source not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(Error::Load(format!("source is not a file: {}", path.display())));
    }
    match SourceFormat::from_path(path) {
        SourceFormat::Parquet => read_parquet_table(path),
        SourceFormat::Json => {
            let bytes = std::fs::read(path)
                .map_err(|e| Error::Load(format!("cannot read {}: {e}", path.display())))?;
            ResultTable::from_json_slice(&bytes)
        }
    }
}

/// Load and validate one model-result source.
///
/// Fails with [`Error::Load`] when the source is missing or undecodable and
/// with [`Error::Schema`] when a required column is absent or entirely null.
/// Rows that cannot be coerced are dropped and reported in the diagnostics.
pub fn load_samples(path: &Path, schema: &SourceSchema, shape: &GridShape) -> Result<LoadOutcome> {
    tracing::debug!(path = %path.display(), "reading model-result source");
    let table = read_table(path)?;
    samples_from_table(table, schema, shape, &PathBuf::from(path).display().to_string())
}

/// Validate an in-memory table into samples.
pub fn samples_from_table(
    mut table: ResultTable,
    schema: &SourceSchema,
    shape: &GridShape,
    source: &str,
) -> Result<LoadOutcome> {
    shape.validate()?;
    let renamed_columns = table.normalize_column_names();

    let truth_col = required_column(&table, &schema.ground_truth)?;
    let pred_col = required_column(&table, &schema.prediction)?;

    let timestamp_source = TimestampSource::resolve(&table, schema);
    if timestamp_source == TimestampSource::Absent {
        tracing::warn!(
            source,
            timestamp = %schema.timestamp,
            date = %schema.date,
            "no timestamp or date column; samples carry no timestamp"
        );
    }
    let ts_col = timestamp_source.column().and_then(|c| table.column(c));
    let lat_col = table.column(&schema.lat);
    let lon_col = table.column(&schema.lon);

    let rows_read = table.n_rows();
    let mut samples = Vec::with_capacity(rows_read);
    let mut dropped = Vec::new();
    let mut truncated_rows = 0usize;
    let mut missing_timestamps = 0usize;

    for row in 0..rows_read {
        let coerced = coerce_cell(truth_col, row, shape)
            .and_then(|gt| coerce_cell(pred_col, row, shape).map(|pred| (gt, pred)));
        let (mut ground_truth, mut prediction) = match coerced {
            Ok(pair) => pair,
            Err(d) => {
                tracing::warn!(source, row, column = %d.column, reason = %d.reason, "dropping row");
                dropped.push(d);
                continue;
            }
        };

        let (h_truth, h_pred) = (ground_truth.ncols(), prediction.ncols());
        if h_truth != h_pred {
            let h = h_truth.min(h_pred);
            tracing::warn!(
                source,
                row,
                ground_truth_days = h_truth,
                prediction_days = h_pred,
                kept_days = h,
                "horizon mismatch; truncating both to the shorter horizon"
            );
            ground_truth = ground_truth.columns(0, h).into_owned();
            prediction = prediction.columns(0, h).into_owned();
            truncated_rows += 1;
        }

        let timestamp = ts_col.and_then(|c| timestamp_source.timestamp_of(&c.cells[row]));
        if ts_col.is_some() && timestamp.is_none() {
            missing_timestamps += 1;
            tracing::debug!(source, row, "unparseable timestamp cell");
        }

        samples.push(SampleRecord {
            row,
            ground_truth,
            prediction,
            coordinates: coordinates_at(lat_col, lon_col, row),
            timestamp,
        });
    }

    tracing::info!(
        source,
        rows = rows_read,
        valid = samples.len(),
        dropped = dropped.len(),
        truncated = truncated_rows,
        "model-result source loaded"
    );

    Ok(LoadOutcome {
        samples,
        diagnostics: LoadDiagnostics {
            source: source.to_string(),
            rows_read,
            dropped,
            truncated_rows,
            missing_timestamps,
            renamed_columns,
            timestamp_source,
        },
    })
}

fn required_column<'a>(table: &'a ResultTable, name: &str) -> Result<&'a Column> {
    let col = table.column(name).ok_or_else(|| {
        Error::Schema(format!(
            "required column '{name}' is absent (columns: {})",
            table.column_names().join(", ")
        ))
    })?;
    if col.is_entirely_null() {
        return Err(Error::Schema(format!("required column '{name}' is entirely null")));
    }
    Ok(col)
}

fn coerce_cell(
    col: &Column,
    row: usize,
    shape: &GridShape,
) -> std::result::Result<nalgebra::DMatrix<f64>, DroppedRow> {
    coerce_matrix(&col.cells[row], shape).map_err(|e: ReshapeError| DroppedRow {
        row,
        column: col.name.clone(),
        reason: e.to_string(),
    })
}

fn coordinates_at(lat: Option<&Column>, lon: Option<&Column>, row: usize) -> Option<Coordinates> {
    let (lat, lon) = (lat?, lon?);
    let grid = |cell: &Cell| flatten_numeric(cell).ok();
    match (grid(&lat.cells[row]), grid(&lon.cells[row])) {
        (Some((lat, lat_shape)), Some((lon, lon_shape))) => {
            Some(Coordinates { lat, lat_shape, lon, lon_shape })
        }
        _ => {
            tracing::debug!(row, "coordinate cells missing or non-numeric; coordinates dropped");
            None
        }
    }
}
