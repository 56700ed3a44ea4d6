//! Split a metric into historical and forecast halves around the boundary.
//!
//! Chart renderers draw `historical` as a solid line and `forecast` as a
//! dashed one. A single bridge point, shared by both halves, keeps the two
//! lines connected.

use crate::domain::{Boundary, StitchedSeries};

/// Split a trending metric (baseline, ML, optional rows).
///
/// Every value on or before the boundary goes to `historical`, every value
/// after it to `forecast`, then the bridge rule is applied.
pub fn split_historical_future(values: &[Option<f64>], boundary: Boundary) -> StitchedSeries {
    let (historical, forecast) = split(values, boundary);
    bridge(StitchedSeries { historical, forecast })
}

/// Split the consensus metric.
///
/// Consensus is only forecast one period ahead: of the values after the
/// boundary, only the first non-empty one is kept.
pub fn split_consensus_future(values: &[Option<f64>], boundary: Boundary) -> StitchedSeries {
    let (historical, mut forecast) = split(values, boundary);
    if let Some(first) = forecast.iter().position(Option::is_some) {
        for slot in forecast.iter_mut().skip(first + 1) {
            *slot = None;
        }
    }
    bridge(StitchedSeries { historical, forecast })
}

fn split(values: &[Option<f64>], boundary: Boundary) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if boundary.is_historical(i) {
                (*v, None)
            } else {
                (None, *v)
            }
        })
        .unzip()
}

/// At the first empty-to-filled transition in `forecast`, copy the historical
/// value just before it into `forecast`. The historical value stays in place,
/// so both halves share that one point.
fn bridge(mut series: StitchedSeries) -> StitchedSeries {
    let transition = (1..series.forecast.len())
        .find(|&i| series.forecast[i].is_some() && series.forecast[i - 1].is_none());
    if let Some(i) = transition {
        series.forecast[i - 1] = series.historical[i - 1];
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trending_metric_bridges_at_boundary() {
        let values = [Some(10.0), Some(12.0), Some(14.0), Some(16.0)];
        let s = split_historical_future(&values, Boundary::At(1));
        assert_eq!(s.historical, vec![Some(10.0), Some(12.0), None, None]);
        assert_eq!(s.forecast, vec![None, Some(12.0), Some(14.0), Some(16.0)]);
        assert_eq!(s.bridge_index(), Some(1));
    }

    #[test]
    fn no_forecast_data_means_no_bridge() {
        let values = [Some(10.0), Some(12.0), None, None];
        let s = split_historical_future(&values, Boundary::At(1));
        assert_eq!(s.historical, vec![Some(10.0), Some(12.0), None, None]);
        assert_eq!(s.forecast, vec![None, None, None, None]);
        assert_eq!(s.bridge_index(), None);
    }

    #[test]
    fn consensus_keeps_only_first_future_value() {
        let values = [Some(5.0), Some(6.0), Some(7.0), Some(8.0)];
        let s = split_consensus_future(&values, Boundary::At(1));
        assert_eq!(s.historical, vec![Some(5.0), Some(6.0), None, None]);
        assert_eq!(s.forecast, vec![None, Some(6.0), Some(7.0), None]);
    }

    #[test]
    fn consensus_gap_after_boundary_leaves_no_bridge() {
        let values = [Some(5.0), Some(6.0), None, Some(8.0)];
        let s = split_consensus_future(&values, Boundary::At(1));
        assert_eq!(s.forecast, vec![None, None, None, Some(8.0)]);
        assert_eq!(s.bridge_index(), None);
    }

    #[test]
    fn whole_range_in_future() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        let s = split_historical_future(&values, Boundary::BeforeStart);
        assert_eq!(s.historical, vec![None, None, None]);
        assert_eq!(s.forecast, vec![Some(1.0), Some(2.0), Some(3.0)]);

        let c = split_consensus_future(&values, Boundary::BeforeStart);
        assert_eq!(c.forecast, vec![Some(1.0), None, None]);
    }

    #[test]
    fn boundary_on_last_period_has_no_forecast() {
        let values = [Some(1.0), Some(2.0)];
        let s = split_historical_future(&values, Boundary::At(1));
        assert_eq!(s.historical, vec![Some(1.0), Some(2.0)]);
        assert_eq!(s.forecast, vec![None, None]);
    }

    #[test]
    fn empty_historical_value_is_copied_as_empty() {
        let values = [Some(1.0), None, Some(3.0)];
        let s = split_historical_future(&values, Boundary::At(1));
        assert_eq!(s.historical, vec![Some(1.0), None, None]);
        assert_eq!(s.forecast, vec![None, None, Some(3.0)]);
    }

    fn arb_values() -> impl Strategy<Value = Vec<Option<f64>>> {
        prop::collection::vec(prop::option::of(-1000.0f64..1000.0), 1..24)
    }

    proptest! {
        #[test]
        fn at_most_one_shared_point_located_at_boundary(
            values in arb_values(),
            b in prop::option::of(0usize..24),
            consensus in any::<bool>(),
        ) {
            // `None` stands for a range that lies entirely in the future.
            let boundary = b.map_or(Boundary::BeforeStart, |b| Boundary::At(b % values.len()));
            let s = if consensus {
                split_consensus_future(&values, boundary)
            } else {
                split_historical_future(&values, boundary)
            };

            prop_assert_eq!(s.historical.len(), values.len());
            prop_assert_eq!(s.forecast.len(), values.len());

            let shared: Vec<usize> = (0..values.len())
                .filter(|&i| s.historical[i].is_some() && s.forecast[i].is_some())
                .collect();
            prop_assert!(shared.len() <= 1);
            match boundary {
                Boundary::At(b) => {
                    if let Some(&i) = shared.first() {
                        prop_assert_eq!(i, b);
                    }
                }
                Boundary::BeforeStart => {
                    prop_assert!(shared.is_empty());
                    prop_assert!(s.historical.iter().all(Option::is_none));
                }
            }
        }

        #[test]
        fn consensus_forecast_has_at_most_one_point_after_boundary(
            values in arb_values(),
            b in prop::option::of(0usize..24),
        ) {
            let boundary = b.map_or(Boundary::BeforeStart, |b| Boundary::At(b % values.len()));
            let s = split_consensus_future(&values, boundary);
            let after = s
                .forecast
                .iter()
                .skip(boundary.first_future())
                .filter(|v| v.is_some())
                .count();
            prop_assert!(after <= 1);
        }
    }
}
