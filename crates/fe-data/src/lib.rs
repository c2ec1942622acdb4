//! # fe-data
//!
//! Model-result loading for ForecastEval.
//!
//! A model-result source is a table with one row per forecast sample. This
//! crate reads it (JSON or Parquet), checks the required columns, coerces each
//! row's ground truth / prediction cells into `grid_points × horizon` matrices
//! and drops rows that cannot be coerced. Dropping a row is never fatal;
//! an empty result is returned as an ordinary outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Typed table cells shared by every source format.
pub mod cell;
/// Source loading and per-row validation.
pub mod loader;
/// Cell → matrix coercion.
pub mod matrix;
/// Parquet source reader.
pub mod parquet_source;
/// Validated per-sample records.
pub mod sample;
/// Column names of a model-result source.
pub mod schema;
/// Columnar in-memory table.
pub mod table;
/// Timestamp resolution (direct / derived-from-date / absent).
pub mod timestamp;

pub use cell::Cell;
pub use loader::{
    DroppedRow, LoadDiagnostics, LoadOutcome, SourceFormat, load_samples, read_table,
    samples_from_table,
};
pub use matrix::{ReshapeError, coerce_matrix};
pub use sample::{Coordinates, SampleRecord};
pub use schema::SourceSchema;
pub use table::{Column, ResultTable};
pub use timestamp::TimestampSource;
