//! Format-independent cell values.
//!
//! JSON and Parquet sources are both lowered to [`Cell`] so that validation
//! and reshaping only ever see one representation.

use serde_json::Value;

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Any numeric scalar, widened to f64
    Number(f64),
    /// Text (dates, timestamps, labels, numeric strings)
    Text(String),
    /// Nested sequence (vectors, matrices)
    List(Vec<Cell>),
}

impl Cell {
    /// `true` for [`Cell::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Short type name used in drop reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::Number(_) => "number",
            Cell::Text(_) => "text",
            Cell::List(_) => "list",
        }
    }

    /// Numeric value of a scalar cell.
    ///
    /// Numeric strings are accepted (`"1.5"`), booleans are not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) => Some(*x),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::Text(s),
            Value::Array(items) => Cell::List(items.into_iter().map(Cell::from).collect()),
            // Nested objects carry no numeric meaning for this table; keep them opaque.
            other @ Value::Object(_) => Cell::Text(other.to_string()),
        }
    }
}
