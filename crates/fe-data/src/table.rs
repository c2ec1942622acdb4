//! Columnar in-memory representation of a model-result source.

use fe_core::{Error, Result};
use serde_json::{Map, Value};

use crate::cell::Cell;

/// One named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name as found in the source (after normalization, trimmed).
    pub name: String,
    /// One cell per row.
    pub cells: Vec<Cell>,
}

impl Column {
    /// `true` when every cell is null (vacuously false for zero rows).
    pub fn is_entirely_null(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(Cell::is_null)
    }
}

/// Rectangular table: every column has the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<Column>,
}

impl ResultTable {
    /// Build a table from columns, rejecting ragged column lengths.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.cells.len();
            if let Some(bad) = columns.iter().find(|c| c.cells.len() != n) {
                return Err(Error::Load(format!(
                    "column '{}' has {} rows, expected {} (from column '{}')",
                    bad.name,
                    bad.cells.len(),
                    n,
                    first.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Decode a JSON table.
    ///
    /// Accepts records orientation (`[{"col": v, ...}, ...]`) and columns
    /// orientation (`{"col": [v, ...]}` or pandas-style `{"col": {"0": v, ...}}`).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::Load(format!("undecodable JSON source: {e}")))?;
        match value {
            Value::Array(rows) => Self::from_json_records(rows),
            Value::Object(map) => Self::from_json_columns(map),
            other => Err(Error::Load(format!(
                "expected an array of records or an object of columns, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_json_records(rows: Vec<Value>) -> Result<Self> {
        let mut columns: Vec<Column> = Vec::new();
        let n_rows = rows.len();

        for (i, row) in rows.into_iter().enumerate() {
            let fields = match row {
                Value::Object(fields) => fields,
                other => {
                    return Err(Error::Load(format!(
                        "record {i} is {}, expected an object",
                        json_kind(&other)
                    )));
                }
            };
            for (name, value) in fields {
                let idx = match columns.iter().position(|c| c.name == name) {
                    Some(idx) => idx,
                    None => {
                        // Columns first seen after row 0 are null-padded for earlier rows.
                        columns.push(Column { name, cells: vec![Cell::Null; n_rows] });
                        columns.len() - 1
                    }
                };
                columns[idx].cells[i] = Cell::from(value);
            }
        }

        Self::from_columns(columns)
    }

    fn from_json_columns(map: Map<String, Value>) -> Result<Self> {
        let mut columns = Vec::with_capacity(map.len());
        // Row index of the first index-object column; every other one must match it.
        let mut row_index: Option<(String, Vec<u64>)> = None;
        for (name, value) in map {
            let cells = match value {
                Value::Array(items) => items.into_iter().map(Cell::from).collect(),
                Value::Object(by_index) => {
                    let (keys, cells) = indexed_cells(&name, by_index)?;
                    match &row_index {
                        Some((first, expected)) if *expected != keys => {
                            return Err(Error::Load(format!(
                                "columns '{first}' and '{name}' have different row indexes"
                            )));
                        }
                        Some(_) => {}
                        None => row_index = Some((name.clone(), keys)),
                    }
                    cells
                }
                other => {
                    return Err(Error::Load(format!(
                        "column '{name}' is {}, expected an array or an index object",
                        json_kind(&other)
                    )));
                }
            };
            columns.push(Column { name, cells });
        }
        Self::from_columns(columns)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    /// All columns in source order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in source order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Trim surrounding whitespace from every column name.
    ///
    /// When two names collide after trimming the first one wins and the later
    /// column is discarded. Returns the number of renamed columns.
    pub fn normalize_column_names(&mut self) -> usize {
        let mut renamed = 0;
        let mut kept: Vec<Column> = Vec::with_capacity(self.columns.len());
        for mut col in std::mem::take(&mut self.columns) {
            let trimmed = col.name.trim();
            if trimmed.len() != col.name.len() {
                col.name = trimmed.to_string();
                renamed += 1;
            }
            if kept.iter().any(|k| k.name == col.name) {
                tracing::warn!(column = %col.name, "duplicate column after name normalization; keeping the first");
                continue;
            }
            kept.push(col);
        }
        self.columns = kept;
        renamed
    }
}

/// Cells of an index-object column in index order, with the sorted index.
fn indexed_cells(column: &str, by_index: Map<String, Value>) -> Result<(Vec<u64>, Vec<Cell>)> {
    let mut indexed: Vec<(u64, Value)> = Vec::with_capacity(by_index.len());
    for (key, value) in by_index {
        let idx = key.trim().parse::<u64>().map_err(|_| {
            Error::Load(format!("column '{column}' has non-integer row index '{key}'"))
        })?;
        indexed.push((idx, value));
    }
    indexed.sort_by_key(|(idx, _)| *idx);
    Ok(indexed.into_iter().map(|(idx, v)| (idx, Cell::from(v))).unzip())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
