//! Export a forecast view to JSON or CSV.
//!
//! JSON carries the full view (labels, boundary index, edit classes, stitched
//! series). CSV is a wide table meant for spreadsheets: one column per period,
//! one row per metric, preceded by an edit-class row.

use std::fs::File;
use std::path::Path;

use crate::app::pipeline::ForecastView;
use crate::error::AppError;

/// Write the whole view as pretty JSON.
pub fn write_view_json(path: &Path, view: &ForecastView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, view)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote view JSON");
    Ok(())
}

/// Write the raw per-period values as a wide CSV table.
pub fn write_view_csv(path: &Path, view: &ForecastView) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let row_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV row: {e}"));

    writer
        .write_record(std::iter::once("metric").chain(view.labels.iter().map(String::as_str)))
        .map_err(row_err)?;
    writer
        .write_record(std::iter::once("class".to_string()).chain(view.classes.iter().map(|c| c.to_string())))
        .map_err(row_err)?;

    for row in &view.rows {
        let cells = row.values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default());
        writer
            .write_record(std::iter::once(row.metric.display_name().to_string()).chain(cells))
            .map_err(row_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), rows = view.rows.len(), "wrote view CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{ForecastRequest, build_view};
    use crate::domain::{Fallback, Granularity, Metric, MetricValueMap};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn view() -> ForecastView {
        let request = ForecastRequest {
            start: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            granularity: Granularity::Monthly,
            fallback: Fallback::Nearest,
        };
        let mut values = MetricValueMap::new();
        values.insert(
            "Oct 24".to_string(),
            BTreeMap::from([(Metric::Actual, Some(100.0)), (Metric::Other("Promo, TV".to_string()), Some(1.5))]),
        );
        values.insert("Dec 24".to_string(), BTreeMap::from([(Metric::Consensus, Some(110.0))]));
        build_view(&request, &values, NaiveDate::from_ymd_opt(2024, 11, 3).unwrap()).unwrap()
    }

    #[test]
    fn csv_is_wide_with_class_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.csv");
        write_view_csv(&path, &view()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "metric,Oct 24,Nov 24,Dec 24",
                "class,Past,Current,Editable",
                "Actual,100,,",
                "Baseline Forecast,,,",
                "ML Forecast,,,",
                "Consensus,,,110",
                "\"Promo, TV\",1.5,,",
            ]
        );
    }

    #[test]
    fn json_round_trips_through_serde_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        write_view_json(&path, &view()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["granularity"], "monthly");
        assert_eq!(json["labels"][1], "Nov 24");
        assert_eq!(json["boundary_index"], 1);
    }

    #[test]
    fn csv_quotes_metric_names_with_quotes_and_line_breaks() {
        let mut view = view();
        view.rows[4].metric = Metric::Other("Promo \"TV\"\r\nQ4".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.csv");
        write_view_csv(&path, &view).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Promo \"\"TV\"\"\r\nQ4\",1.5,,"));

        let mut reader = csv::ReaderBuilder::new().from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 6);
        assert_eq!(&records[5][0], "Promo \"TV\"\r\nQ4");
        assert_eq!(&records[5][1], "1.5");
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("view.csv");
        assert_eq!(write_view_csv(&path, &view()).unwrap_err().exit_code(), 2);
    }
}
