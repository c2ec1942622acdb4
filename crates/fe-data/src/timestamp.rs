//! Sample timestamp resolution.
//!
//! Which column (if any) supplies the timestamp is decided once per load and
//! recorded as a [`TimestampSource`]; rows are then converted without
//! re-checking the table layout.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cell::Cell;
use crate::schema::SourceSchema;
use crate::table::ResultTable;

/// Hours added to a date-only value to obtain the sample timestamp.
pub const DATE_ONLY_OFFSET_HOURS: i64 = 12;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Where sample timestamps come from, resolved once per load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum TimestampSource {
    /// A full timestamp column exists.
    Direct(String),
    /// Derived from a date-only column plus [`DATE_ONLY_OFFSET_HOURS`].
    DerivedFromDate(String),
    /// Neither column exists; samples carry no timestamp.
    Absent,
}

impl TimestampSource {
    /// Pick the timestamp source for a (normalized) table.
    pub fn resolve(table: &ResultTable, schema: &SourceSchema) -> Self {
        if table.column(&schema.timestamp).is_some() {
            TimestampSource::Direct(schema.timestamp.clone())
        } else if table.column(&schema.date).is_some() {
            TimestampSource::DerivedFromDate(schema.date.clone())
        } else {
            TimestampSource::Absent
        }
    }

    /// Column the timestamps are read from.
    pub fn column(&self) -> Option<&str> {
        match self {
            TimestampSource::Direct(c) | TimestampSource::DerivedFromDate(c) => Some(c),
            TimestampSource::Absent => None,
        }
    }

    /// Convert one cell of [`Self::column`] into a timestamp.
    ///
    /// Returns `None` for null or unparseable cells.
    pub fn timestamp_of(&self, cell: &Cell) -> Option<NaiveDateTime> {
        match self {
            TimestampSource::Direct(_) => parse_datetime(cell),
            TimestampSource::DerivedFromDate(_) => {
                parse_datetime(cell).map(|t| t + Duration::hours(DATE_ONLY_OFFSET_HOURS))
            }
            TimestampSource::Absent => None,
        }
    }
}

/// Parse a cell as a datetime.
///
/// Text accepts RFC 3339, common `Y-m-d H:M:S` layouts and date-only layouts
/// (midnight). Numbers are Unix epoch milliseconds.
pub fn parse_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Number(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(*ms as i64).map(|t| t.naive_utc())
        }
        Cell::Text(raw) => parse_datetime_str(raw.trim()),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
