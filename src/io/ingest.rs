//! Metric value ingest and normalization.
//!
//! This module turns the API's JSON body, or an equivalent file on disk, into a
//! clean `MetricValueMap`:
//!
//! - JSON: `{ "periods": { "<label>": { "<metric>": number | null | "-" } } }`
//! - CSV (long form): `period,metric,value`, one cell per row
//!
//! "No data" is spelled `null`, `"-"` or an empty cell; all map to `None`.
//! CSV rows that cannot be read are collected as row errors and skipped. JSON
//! text cells that are not numbers are collected as cell errors and read as `None`.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use crate::domain::{Metric, MetricValueMap};
use crate::error::AppError;

/// Wire format shared by the REST API and JSON input files.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub periods: BTreeMap<String, BTreeMap<String, Option<RawCell>>>,
}

/// A single cell as delivered upstream: a number, or a placeholder string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
}

impl RawCell {
    fn value(&self) -> Result<Option<f64>, String> {
        match self {
            RawCell::Number(v) => Ok(Some(*v).filter(|v| v.is_finite())),
            RawCell::Text(s) => parse_opt_value(s),
        }
    }
}

/// A JSON cell whose text could not be read as a number. The cell is kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellError {
    pub period: String,
    pub metric: String,
    pub message: String,
}

impl ForecastPayload {
    /// Normalize the payload. Unreadable cells become `None` and are returned alongside.
    pub fn into_values(self) -> (MetricValueMap, Vec<CellError>) {
        let mut values = MetricValueMap::new();
        let mut cell_errors = Vec::new();

        for (label, cells) in self.periods {
            let period = label.trim().to_string();
            let mut row = BTreeMap::new();
            for (metric, cell) in cells {
                let value = match cell.as_ref().map(RawCell::value).transpose() {
                    Ok(value) => value.flatten(),
                    Err(message) => {
                        cell_errors.push(CellError {
                            period: period.clone(),
                            metric: metric.clone(),
                            message,
                        });
                        None
                    }
                };
                row.insert(Metric::from(metric), value);
            }
            values.insert(period, row);
        }

        (values, cell_errors)
    }
}

/// Log skipped JSON cells, one warning each.
pub fn warn_cell_errors(cell_errors: &[CellError]) {
    for err in cell_errors {
        tracing::warn!(period = %err.period, metric = %err.metric, message = %err.message, "skipped input cell");
    }
}

/// A row-level error encountered during CSV ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: values + row errors (CSV) + cell errors (JSON).
#[derive(Debug, Clone)]
pub struct LoadedValues {
    pub values: MetricValueMap,
    pub row_errors: Vec<RowError>,
    pub cell_errors: Vec<CellError>,
    pub rows_read: usize,
}

/// Load a value map from a `.json` or `.csv` file.
pub fn load_values(path: &Path) -> Result<LoadedValues, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;

    let loaded = match ext.as_deref() {
        Some("json") => {
            let payload: ForecastPayload = serde_json::from_reader(file)
                .map_err(|e| AppError::new(2, format!("Invalid forecast JSON '{}': {e}", path.display())))?;
            let (values, cell_errors) = payload.into_values();
            LoadedValues {
                rows_read: values.len(),
                values,
                row_errors: Vec::new(),
                cell_errors,
            }
        }
        Some("csv") => read_csv(file)?,
        _ => {
            return Err(AppError::new(
                2,
                format!("Unsupported input '{}': expected a .json or .csv file.", path.display()),
            ));
        }
    };

    warn_cell_errors(&loaded.cell_errors);
    tracing::info!(
        path = %path.display(),
        periods = loaded.values.len(),
        row_errors = loaded.row_errors.len(),
        cell_errors = loaded.cell_errors.len(),
        "loaded metric values"
    );
    Ok(loaded)
}

/// Read long-form CSV (`period,metric,value`).
pub fn read_csv<R: Read>(reader: R) -> Result<LoadedValues, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["period", "metric", "value"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(2, format!("Missing required column: `{required}`")));
        }
    }

    let mut values = MetricValueMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line, then 1-based numbering.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok((period, metric, value)) => {
                let previous = values.entry(period).or_default().insert(metric, value);
                if previous.is_some() {
                    tracing::debug!(line, "duplicate period/metric cell, keeping the later row");
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(LoadedValues {
        values,
        row_errors,
        cell_errors: Vec::new(),
        rows_read,
    })
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<(String, Metric, Option<f64>), String> {
    let period = get_required(record, header_map, "period")?.to_string();
    let metric = Metric::from(get_required(record, header_map, "metric")?);
    let value = parse_opt_value(get_optional(record, header_map, "value").unwrap_or(""))?;
    Ok((period, metric, value))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim)
}

/// `""` and `"-"` are "no data"; anything else must be a finite number.
fn parse_opt_value(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("Invalid value '{s}'.")),
    }
}
