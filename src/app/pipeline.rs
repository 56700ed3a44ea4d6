//! Shared "view pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load values -> labels -> boundary -> stitched series -> edit classes
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    Boundary, DataSource, EditClass, Fallback, Granularity, Metric, MetricValueMap, RunConfig,
    StitchedSeries,
};
use crate::error::{AppError, PeriodError};
use crate::periods::{self, PeriodSequence};

/// What to bucket: a date range at one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub fallback: Fallback,
}

impl ForecastRequest {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            start: config.start,
            end: config.end,
            granularity: config.granularity,
            fallback: config.fallback,
        }
    }
}

/// One table row / chart metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: Metric,
    /// Raw values aligned with the labels.
    pub values: Vec<Option<f64>>,
    pub series: StitchedSeries,
}

/// Everything the table and chart renderers need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub granularity: Granularity,
    pub today: NaiveDate,
    pub labels: Vec<String>,
    pub anchors: Vec<NaiveDate>,
    pub boundary_index: i64,
    #[serde(skip)]
    pub boundary: Boundary,
    pub classes: Vec<EditClass>,
    pub rows: Vec<MetricRow>,
}

impl ForecastView {
    pub fn row(&self, metric: &Metric) -> Option<&MetricRow> {
        self.rows.iter().find(|r| r.metric == *metric)
    }

    pub fn editable_index(&self) -> Option<usize> {
        periods::editable_index(&self.classes)
    }

    /// Overwrite the consensus value of the editable period.
    ///
    /// Any other period is rejected with `LockedPeriod`.
    pub fn apply_consensus_edit(&mut self, index: usize, value: Option<f64>) -> Result<(), PeriodError> {
        periods::ensure_editable(&self.classes, index)?;

        let boundary = self.boundary;
        if !self.rows.iter().any(|r| r.metric.is_consensus()) {
            let empty = vec![None; self.labels.len()];
            self.rows.push(MetricRow {
                metric: Metric::Consensus,
                series: periods::split_consensus_future(&empty, boundary),
                values: empty,
            });
            self.rows.sort_by(|a, b| a.metric.cmp(&b.metric));
        }
        let Some(row) = self.rows.iter_mut().find(|r| r.metric.is_consensus()) else {
            return Err(PeriodError::EmptySequence);
        };

        row.values[index] = value;
        row.series = periods::split_consensus_future(&row.values, boundary);
        tracing::info!(label = %self.labels[index], ?value, "consensus edited");
        Ok(())
    }
}

/// Build the view for already-loaded values.
///
/// `today` is injected; nothing here reads the clock.
pub fn build_view(
    request: &ForecastRequest,
    values: &MetricValueMap,
    today: NaiveDate,
) -> Result<ForecastView, PeriodError> {
    let sequence = periods::build_sequence(request.start, request.end, request.granularity)?;
    let boundary = periods::find_boundary(&sequence.labels, request.granularity, today, request.fallback)?;
    Ok(assemble(sequence, boundary, values, today))
}

fn assemble(sequence: PeriodSequence, boundary: Boundary, values: &MetricValueMap, today: NaiveDate) -> ForecastView {
    for label in values.keys() {
        if sequence.position(label).is_none() {
            tracing::debug!(%label, "ignoring values for period outside the sequence");
        }
    }

    let mut metrics: BTreeSet<Metric> = Metric::KNOWN.into_iter().collect();
    for label in &sequence.labels {
        if let Some(cells) = values.get(label) {
            metrics.extend(cells.keys().cloned());
        }
    }

    let rows = metrics
        .into_iter()
        .map(|metric| {
            let row_values: Vec<Option<f64>> = sequence
                .labels
                .iter()
                .map(|label| values.get(label).and_then(|cells| cells.get(&metric)).copied().flatten())
                .collect();
            let series = if metric.is_consensus() {
                periods::split_consensus_future(&row_values, boundary)
            } else {
                periods::split_historical_future(&row_values, boundary)
            };
            MetricRow {
                metric,
                values: row_values,
                series,
            }
        })
        .collect();

    let classes = periods::classify(&sequence.labels, boundary);

    ForecastView {
        granularity: sequence.granularity,
        today,
        labels: sequence.labels,
        anchors: sequence.anchors,
        boundary_index: boundary.as_index(),
        boundary,
        classes,
        rows,
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub request: ForecastRequest,
    pub values: MetricValueMap,
    pub view: ForecastView,
}

/// Load values from the configured source and build the view.
pub fn run_view(config: &RunConfig) -> Result<RunOutput, AppError> {
    let request = ForecastRequest::from_config(config);
    let values = load_values(config, &request)?;
    run_view_with_values(config, request, values)
}

/// Build the view from pre-loaded values.
///
/// This is useful for the TUI where we want to re-bucket without re-fetching.
pub fn run_view_with_values(
    config: &RunConfig,
    request: ForecastRequest,
    values: MetricValueMap,
) -> Result<RunOutput, AppError> {
    let view = build_view(&request, &values, config.today)?;
    tracing::info!(
        granularity = %request.granularity,
        periods = view.labels.len(),
        boundary = view.boundary_index,
        "built forecast view"
    );
    Ok(RunOutput { request, values, view })
}

fn load_values(config: &RunConfig, request: &ForecastRequest) -> Result<MetricValueMap, AppError> {
    match &config.source {
        DataSource::Api => {
            let client = crate::data::DemandApiClient::from_env()?;
            client.fetch_values(request)
        }
        DataSource::File(path) => {
            let ingested = crate::io::load_values(path)?;
            for err in &ingested.row_errors {
                tracing::warn!(line = err.line, message = %err.message, "skipped input row");
            }
            Ok(ingested.values)
        }
        DataSource::Sample { seed } => {
            let sequence = periods::build_sequence(request.start, request.end, request.granularity)?;
            let boundary =
                periods::find_boundary(&sequence.labels, request.granularity, config.today, request.fallback)?;
            crate::data::generate_sample(&sequence, boundary, *seed)
        }
    }
}
