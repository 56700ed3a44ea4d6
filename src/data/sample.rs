//! Synthetic demand generation for offline runs and demos.
//!
//! Demand follows a linear trend with yearly seasonality. Each row mimics what
//! the planning API returns:
//! - `Actual`: observed demand, only on or before the boundary
//! - `Baseline Forecast`: the smooth trend + seasonality, every period
//! - `ML Forecast`: baseline plus model noise, every period
//! - `Consensus`: agreed numbers for past periods and the editable one

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use chrono::Datelike;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Boundary, Metric, MetricValueMap};
use crate::error::AppError;
use crate::periods::PeriodSequence;

const BASE_LEVEL: f64 = 1_000.0;
/// Trend per month; weekly sequences use a quarter of it.
const MONTHLY_TREND: f64 = 12.0;
/// Peak-to-mean seasonal swing as a fraction of the level.
const SEASONAL_AMPLITUDE: f64 = 0.15;
/// Relative noise of actuals around the baseline.
const ACTUAL_NOISE: f64 = 0.06;
/// Relative noise of the ML forecast around the baseline.
const ML_NOISE: f64 = 0.03;

pub fn generate_sample(
    sequence: &PeriodSequence,
    boundary: Boundary,
    seed: u64,
) -> Result<MetricValueMap, AppError> {
    let mut rng = StdRng::seed_from_u64(sample_seed(sequence, seed));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let trend = match sequence.granularity {
        crate::domain::Granularity::Monthly => MONTHLY_TREND,
        crate::domain::Granularity::Weekly => MONTHLY_TREND / 4.0,
    };
    let scale = match sequence.granularity {
        crate::domain::Granularity::Monthly => 1.0,
        crate::domain::Granularity::Weekly => 0.25,
    };
    let editable = boundary.first_future();

    let mut values = MetricValueMap::new();
    for (i, (label, anchor)) in sequence.labels.iter().zip(&sequence.anchors).enumerate() {
        let year_frac = f64::from(anchor.ordinal0()) / 365.25;
        let seasonal = 1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * year_frac).sin();
        let baseline = (BASE_LEVEL + trend * i as f64) * seasonal * scale;

        let mut cells = BTreeMap::new();
        cells.insert(Metric::BaselineForecast, Some(baseline.round()));

        let ml = baseline * (ML_NOISE * normal.sample(&mut rng)).exp();
        cells.insert(Metric::MlForecast, Some(ml.round()));

        let actual = if boundary.is_historical(i) {
            Some((baseline * (ACTUAL_NOISE * normal.sample(&mut rng)).exp()).round())
        } else {
            None
        };
        cells.insert(Metric::Actual, actual);

        // Past consensus sits between the baseline and what actually happened.
        let consensus = match actual {
            Some(a) => Some((0.5 * (a + baseline)).round()),
            None if i == editable => Some(((ml + baseline) * 0.5).round()),
            None => None,
        };
        cells.insert(Metric::Consensus, consensus);

        values.insert(label.clone(), cells);
    }

    Ok(values)
}

fn sample_seed(sequence: &PeriodSequence, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    sequence.granularity.hash(&mut hasher);
    sequence.first_anchor().hash(&mut hasher);
    seed.hash(&mut hasher);
    hasher.finish()
}
