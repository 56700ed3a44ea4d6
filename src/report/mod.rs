//! Reporting utilities: per-metric totals and formatted terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::app::pipeline::ForecastView;
use crate::domain::Metric;

/// Sum of a metric on each side of the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTotals {
    pub metric: Metric,
    pub historical: Option<f64>,
    pub forecast: Option<f64>,
}

/// Totals per row. The bridge point belongs to the historical side only.
pub fn compute_totals(view: &ForecastView) -> Vec<MetricTotals> {
    let bridge = view.boundary.first_future();
    view.rows
        .iter()
        .map(|row| {
            let historical = sum(row.series.historical.iter().copied());
            let forecast = sum(
                row.series
                    .forecast
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i >= bridge)
                    .map(|(_, v)| *v),
            );
            MetricTotals {
                metric: row.metric.clone(),
                historical,
                forecast,
            }
        })
        .collect()
}

fn sum(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Boundary, StitchedSeries};
    use crate::periods;

    #[test]
    fn totals_do_not_double_count_bridge_point() {
        let values = vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)];
        let boundary = Boundary::At(1);
        let series: StitchedSeries = periods::split_historical_future(&values, boundary);
        assert_eq!(series.forecast[1], Some(20.0));

        let view = ForecastView {
            granularity: crate::domain::Granularity::Monthly,
            today: chrono::NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            labels: vec!["Oct 24".into(), "Nov 24".into(), "Dec 24".into(), "Jan 25".into()],
            anchors: Vec::new(),
            boundary_index: boundary.as_index(),
            boundary,
            classes: periods::classify(&["Oct 24", "Nov 24", "Dec 24", "Jan 25"], boundary),
            rows: vec![crate::app::pipeline::MetricRow {
                metric: Metric::BaselineForecast,
                values,
                series,
            }],
        };

        let totals = compute_totals(&view);
        assert_eq!(totals[0].historical, Some(30.0));
        assert_eq!(totals[0].forecast, Some(70.0));
    }

    #[test]
    fn totals_of_empty_row_are_none() {
        assert_eq!(sum([None, None].into_iter()), None);
        assert_eq!(sum([None, Some(0.0)].into_iter()), Some(0.0));
    }
}
