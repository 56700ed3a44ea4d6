//! Locate "the current period" inside a label sequence.
//!
//! An exact label match wins. Otherwise a fallback picks a deterministic
//! split point, so ranges that do not contain today (e.g. a report for a past
//! quarter) still get a boundary.

use chrono::NaiveDate;

use crate::domain::{Boundary, Fallback, Granularity};
use crate::error::PeriodError;
use crate::periods::calendar::month_key;

/// Boundary of a monthly sequence using the nearest-period fallback.
pub fn find_monthly_boundary(labels: &[String], today: NaiveDate) -> Result<Boundary, PeriodError> {
    find_boundary(labels, Granularity::Monthly, today, Fallback::Nearest)
}

/// Boundary of a weekly sequence using the nearest-period fallback.
pub fn find_weekly_boundary(labels: &[String], today: NaiveDate) -> Result<Boundary, PeriodError> {
    find_boundary(labels, Granularity::Weekly, today, Fallback::Nearest)
}

/// Locate today's period in `labels`.
///
/// Labels are only parsed when there is no exact match; a malformed label is
/// reported instead of being skipped.
pub fn find_boundary(
    labels: &[String],
    granularity: Granularity,
    today: NaiveDate,
    fallback: Fallback,
) -> Result<Boundary, PeriodError> {
    if labels.is_empty() {
        return Err(PeriodError::EmptySequence);
    }

    let today_label = granularity.label(today);
    if let Some(idx) = labels.iter().position(|l| *l == today_label) {
        return Ok(Boundary::At(idx));
    }

    let anchors = labels
        .iter()
        .map(|l| granularity.parse_label(l))
        .collect::<Result<Vec<_>, _>>()?;
    let today_start = granularity.period_start(today);

    let boundary = match fallback {
        Fallback::Nearest => nearest(&anchors, granularity, today_start),
        Fallback::NotAfter => latest_not_after(&anchors, today_start),
    };

    tracing::debug!(
        %today_label,
        ?fallback,
        boundary = boundary.as_index(),
        "today's period not in sequence, using fallback"
    );

    Ok(boundary)
}

fn distance(granularity: Granularity, anchor: NaiveDate, today_start: NaiveDate) -> i64 {
    match granularity {
        Granularity::Monthly => (month_key(anchor) - month_key(today_start)).abs(),
        Granularity::Weekly => (anchor - today_start).num_days().abs(),
    }
}

fn nearest(anchors: &[NaiveDate], granularity: Granularity, today_start: NaiveDate) -> Boundary {
    let mut best: Option<(usize, i64)> = None;
    for (idx, &anchor) in anchors.iter().enumerate() {
        let dist = distance(granularity, anchor, today_start);
        // Strictly smaller keeps the earlier index on ties.
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((idx, dist));
        }
    }
    best.map_or(Boundary::BeforeStart, |(idx, _)| Boundary::At(idx))
}

fn latest_not_after(anchors: &[NaiveDate], today_start: NaiveDate) -> Boundary {
    let mut best: Option<(usize, NaiveDate)> = None;
    for (idx, &anchor) in anchors.iter().enumerate() {
        if anchor > today_start {
            continue;
        }
        if best.is_none_or(|(_, a)| anchor > a) {
            best = Some((idx, anchor));
        }
    }
    best.map_or(Boundary::BeforeStart, |(idx, _)| Boundary::At(idx))
}
