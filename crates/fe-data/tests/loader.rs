use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arrow::array::{ArrayRef, Float64Builder, ListBuilder, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use fe_core::{Error, GridShape};
use fe_data::{SourceSchema, TimestampSource, load_samples};
use parquet::arrow::ArrowWriter;
use serde_json::json;

fn tmp_path(filename: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("forecast_eval_loader_{}_{}_{}", std::process::id(), nanos, filename));
    p
}

fn write_json(filename: &str, v: &serde_json::Value) -> PathBuf {
    let p = tmp_path(filename);
    std::fs::write(&p, serde_json::to_vec(v).unwrap()).unwrap();
    p
}

fn series(days: usize, grid_points: usize, base: f64) -> Vec<f64> {
    (0..grid_points * days).map(|i| base + i as f64).collect()
}

#[test]
fn records_json_with_date_column() {
    let shape = GridShape::new(4, 7).unwrap();
    let path = write_json(
        "records.json",
        &json!([
            { "y_rol": series(7, 4, 0.0), "y_rol_pred": series(7, 4, 0.5), "dia_mes_ano": "2024-03-05" },
            { "y_rol": series(7, 4, 1.0), "y_rol_pred": series(7, 4, 1.5), "dia_mes_ano": "2024-03-06" },
        ]),
    );

    let out = load_samples(&path, &SourceSchema::default(), &shape).unwrap();
    assert_eq!(out.samples.len(), 2);
    assert_eq!(out.samples[0].horizon(), 7);
    assert_eq!(out.samples[0].grid_points(), 4);
    assert_eq!(
        out.diagnostics.timestamp_source,
        TimestampSource::DerivedFromDate("dia_mes_ano".into())
    );
    let noon = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap().and_hms_opt(12, 0, 0).unwrap();
    assert_eq!(out.samples[1].timestamp, Some(noon));
    std::fs::remove_file(&path).ok();
}

#[test]
fn columns_json_with_padded_names_and_short_prediction() {
    let shape = GridShape::new(3, 7).unwrap();
    // pandas `to_json(orient="columns")` layout, names padded with spaces.
    let path = write_json(
        "columns.json",
        &json!({
            " y_rol ": { "0": series(7, 3, 0.0) },
            "y_rol_pred ": { "0": series(5, 3, 0.0) },
            "lat": { "0": [[-10.0, -10.0, -10.0]] },
            "lon": { "0": [[40.0, 40.5, 41.0]] },
        }),
    );

    let out = load_samples(&path, &SourceSchema::default(), &shape).unwrap();
    assert_eq!(out.samples.len(), 1);
    let s = &out.samples[0];
    assert_eq!(s.horizon(), 5);
    assert_eq!(s.ground_truth.ncols(), s.prediction.ncols());
    assert_eq!(out.diagnostics.truncated_rows, 1);
    assert_eq!(out.diagnostics.renamed_columns, 2);
    let coords = s.coordinates.as_ref().expect("coordinates");
    assert_eq!(coords.lon, vec![40.0, 40.5, 41.0]);
    assert_eq!(coords.lon_shape, vec![1, 3]);
    assert_eq!(s.timestamp, None);
    std::fs::remove_file(&path).ok();
}

#[test]
fn every_row_failing_is_empty_not_error() {
    let shape = GridShape::new(4, 7).unwrap();
    let path = write_json(
        "all_bad.json",
        &json!([
            { "y_rol": [1.0, 2.0, 3.0], "y_rol_pred": [1.0, 2.0, 3.0] },
            { "y_rol": "not a list", "y_rol_pred": series(1, 4, 0.0) },
        ]),
    );
    let out = load_samples(&path, &SourceSchema::default(), &shape).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.diagnostics.rows_read, 2);
    assert_eq!(out.diagnostics.dropped.len(), 2);
    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_prediction_column_is_schema_error() {
    let shape = GridShape::new(2, 7).unwrap();
    let path = write_json("no_pred.json", &json!([{ "y_rol": [1.0, 2.0] }]));
    let err = load_samples(&path, &SourceSchema::default(), &shape).unwrap_err();
    assert_eq!(err.kind(), "schema");
    assert!(err.to_string().contains("y_rol_pred"), "{err}");
    std::fs::remove_file(&path).ok();
}

#[test]
fn garbage_file_is_load_error() {
    let path = tmp_path("garbage.json");
    std::fs::write(&path, b"{ this is not json").unwrap();
    let err = load_samples(&path, &SourceSchema::default(), &GridShape::default()).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "{err}");
    std::fs::remove_file(&path).ok();

    let pq = tmp_path("garbage.parquet");
    std::fs::write(&pq, b"PAR1 nope").unwrap();
    let err = load_samples(&pq, &SourceSchema::default(), &GridShape::default()).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "{err}");
    std::fs::remove_file(&pq).ok();
}

fn nested_list(rows: &[Vec<Vec<f64>>]) -> ArrayRef {
    let mut outer = ListBuilder::new(ListBuilder::new(Float64Builder::new()));
    for row in rows {
        for point in row {
            for &v in point {
                outer.values().values().append_value(v);
            }
            outer.values().append(true);
        }
        outer.append(true);
    }
    Arc::new(outer.finish())
}

#[test]
fn parquet_source_loads_nested_lists() {
    let shape = GridShape::new(2, 7).unwrap();
    // One sample, 2 grid points x 3 days.
    let truth = nested_list(&[vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]]);
    let pred = nested_list(&[vec![vec![1.5, 2.5, 3.5], vec![4.5, 5.5, 6.5]]]);
    let data: ArrayRef = Arc::new(StringArray::from(vec!["2024-03-05 06:00:00"]));
    let batch =
        RecordBatch::try_from_iter(vec![("y_rol", truth), ("y_rol_pred", pred), ("data", data)])
            .unwrap();

    let path = tmp_path("source.parquet");
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let out = load_samples(&path, &SourceSchema::default(), &shape).unwrap();
    assert_eq!(out.samples.len(), 1);
    let s = &out.samples[0];
    assert_eq!(s.horizon(), 3);
    assert_eq!(s.ground_truth_day(2), vec![3.0, 6.0]);
    assert_eq!(s.prediction_day(0), vec![1.5, 4.5]);
    assert_eq!(out.diagnostics.timestamp_source, TimestampSource::Direct("data".into()));
    let six = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(6, 0, 0).unwrap();
    assert_eq!(s.timestamp, Some(six));
    std::fs::remove_file(&path).ok();
}
