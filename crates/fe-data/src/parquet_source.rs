//! Parquet model-result sources.
//!
//! Matrices are stored as `List<Float64>` (flat, row-major) or
//! `List<List<Float64>>` (one inner list per grid point). Dates may be
//! `Date32` or `Utf8`; timestamps `Timestamp(*)` or `Utf8`.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use chrono::{Duration, NaiveDate};
use fe_core::{Error, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::cell::Cell;
use crate::table::{Column, ResultTable};

/// Read a Parquet file into a [`ResultTable`].
pub fn read_parquet_table(path: &Path) -> Result<ResultTable> {
    let undecodable =
        |e: &dyn std::fmt::Display| Error::Load(format!("undecodable Parquet source {}: {e}", path.display()));

    let file = File::open(path)
        .map_err(|e| Error::Load(format!("cannot open {}: {e}", path.display())))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| undecodable(&e))?;

    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column { name: f.name().clone(), cells: Vec::new() })
        .collect();

    let reader = builder.build().map_err(|e| undecodable(&e))?;
    for batch in reader {
        let batch = batch.map_err(|e| undecodable(&e))?;
        if batch.num_columns() != columns.len() {
            return Err(Error::Load(format!(
                "record batch has {} columns, schema declares {}",
                batch.num_columns(),
                columns.len()
            )));
        }
        for (col, array) in columns.iter_mut().zip(batch.columns()) {
            col.cells.reserve(array.len());
            for i in 0..array.len() {
                col.cells.push(array_cell(array.as_ref(), i));
            }
        }
    }

    ResultTable::from_columns(columns)
}

/// Lower element `i` of an Arrow array to a [`Cell`].
pub fn array_cell(array: &dyn Array, i: usize) -> Cell {
    if array.is_null(i) {
        return Cell::Null;
    }
    match array.data_type() {
        DataType::Float64 => Cell::Number(array.as_primitive::<Float64Type>().value(i)),
        DataType::Float32 => Cell::Number(array.as_primitive::<Float32Type>().value(i) as f64),
        DataType::Int32 => Cell::Number(array.as_primitive::<Int32Type>().value(i) as f64),
        DataType::Int64 => Cell::Number(array.as_primitive::<Int64Type>().value(i) as f64),
        DataType::Boolean => Cell::Bool(array.as_boolean().value(i)),
        DataType::Utf8 => Cell::Text(array.as_string::<i32>().value(i).to_string()),
        DataType::LargeUtf8 => Cell::Text(array.as_string::<i64>().value(i).to_string()),
        DataType::Date32 => date32_cell(array.as_primitive::<Date32Type>().value(i)),
        DataType::Timestamp(unit, _) => Cell::Number(timestamp_millis(array, *unit, i) as f64),
        DataType::List(_) => list_cell(array.as_list::<i32>().value(i).as_ref()),
        DataType::LargeList(_) => list_cell(array.as_list::<i64>().value(i).as_ref()),
        DataType::FixedSizeList(_, _) => list_cell(array.as_fixed_size_list().value(i).as_ref()),
        other => Cell::Text(format!("<{other}>")),
    }
}

fn list_cell(values: &dyn Array) -> Cell {
    Cell::List((0..values.len()).map(|j| array_cell(values, j)).collect())
}

fn date32_cell(days: i32) -> Cell {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days as i64)))
        .map(|d| Cell::Text(d.format("%Y-%m-%d").to_string()))
        .unwrap_or(Cell::Null)
}

fn timestamp_millis(array: &dyn Array, unit: TimeUnit, i: usize) -> i64 {
    match unit {
        TimeUnit::Second => array.as_primitive::<TimestampSecondType>().value(i).saturating_mul(1_000),
        TimeUnit::Millisecond => array.as_primitive::<TimestampMillisecondType>().value(i),
        TimeUnit::Microsecond => array.as_primitive::<TimestampMicrosecondType>().value(i) / 1_000,
        TimeUnit::Nanosecond => array.as_primitive::<TimestampNanosecondType>().value(i) / 1_000_000,
    }
}
