//! Ordered, gap-free period sequences spanning a date range.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Granularity;
use crate::error::PeriodError;

/// Labels of consecutive periods together with their anchor dates.
///
/// Invariant: labels are strictly increasing, gap-free and duplicate-free, and
/// `labels.len() == anchors.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSequence {
    pub granularity: Granularity,
    pub labels: Vec<String>,
    pub anchors: Vec<NaiveDate>,
}

impl PeriodSequence {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn first_anchor(&self) -> Option<NaiveDate> {
        self.anchors.first().copied()
    }

    pub fn last_anchor(&self) -> Option<NaiveDate> {
        self.anchors.last().copied()
    }
}

/// Build the sequence of periods covering `[start, end]`.
///
/// Both dates are first normalized to their period start. A start that lies
/// in a later period than the end is rejected, never swapped or clamped.
pub fn build_sequence(
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Result<PeriodSequence, PeriodError> {
    let first = granularity.period_start(start);
    let last = granularity.period_start(end);
    if first > last {
        return Err(PeriodError::InvalidRange { start, end });
    }

    let mut labels = Vec::new();
    let mut anchors = Vec::new();
    let mut current = Some(first);
    while let Some(anchor) = current.filter(|a| *a <= last) {
        labels.push(granularity.label(anchor));
        anchors.push(anchor);
        current = granularity.advance(anchor);
    }

    Ok(PeriodSequence {
        granularity,
        labels,
        anchors,
    })
}

/// Month labels (`"MMM YY"`) from `start`'s month through `end`'s month.
pub fn build_monthly_labels(start: NaiveDate, end: NaiveDate) -> Result<Vec<String>, PeriodError> {
    build_sequence(start, end, Granularity::Monthly).map(|seq| seq.labels)
}

/// ISO week labels (`"YYYY-Www"`) from `start`'s week through `end`'s week.
pub fn build_weekly_labels(start: NaiveDate, end: NaiveDate) -> Result<Vec<String>, PeriodError> {
    build_sequence(start, end, Granularity::Weekly).map(|seq| seq.labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monthly_labels_cross_year_end() {
        let labels = build_monthly_labels(d(2024, 12, 1), d(2025, 3, 1)).unwrap();
        assert_eq!(labels, vec!["Dec 24", "Jan 25", "Feb 25", "Mar 25"]);
    }

    #[test]
    fn monthly_labels_normalize_mid_month_dates() {
        let labels = build_monthly_labels(d(2024, 1, 31), d(2024, 3, 2)).unwrap();
        assert_eq!(labels, vec!["Jan 24", "Feb 24", "Mar 24"]);
    }

    #[test]
    fn weekly_labels_span_53_week_year() {
        let labels = build_weekly_labels(d(2020, 12, 20), d(2021, 1, 6)).unwrap();
        assert_eq!(labels, vec!["2020-W51", "2020-W52", "2020-W53", "2021-W01"]);
    }

    #[test]
    fn single_period_range() {
        let labels = build_weekly_labels(d(2024, 11, 13), d(2024, 11, 17)).unwrap();
        assert_eq!(labels, vec!["2024-W46"]);

        let labels = build_monthly_labels(d(2024, 11, 20), d(2024, 11, 3)).unwrap();
        assert_eq!(labels, vec!["Nov 24"]);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = build_monthly_labels(d(2025, 3, 1), d(2024, 12, 1)).unwrap_err();
        assert_eq!(
            err,
            PeriodError::InvalidRange {
                start: d(2025, 3, 1),
                end: d(2024, 12, 1)
            }
        );
        assert!(build_weekly_labels(d(2024, 12, 9), d(2024, 12, 1)).is_err());
    }

    #[test]
    fn sequence_carries_anchor_dates() {
        let seq = build_sequence(d(2024, 12, 31), d(2025, 1, 8), Granularity::Weekly).unwrap();
        assert_eq!(seq.anchors, vec![d(2024, 12, 30), d(2025, 1, 6)]);
        assert_eq!(seq.labels, vec!["2025-W01", "2025-W02"]);
        assert_eq!(seq.position("2025-W02"), Some(1));
        assert_eq!(seq.len(), 2);
    }

    proptest! {
        #[test]
        fn sequences_are_gap_free_and_bracket_the_range(
            start_off in 0u64..4000,
            span in 0u64..800,
            weekly in any::<bool>(),
        ) {
            let granularity = if weekly { Granularity::Weekly } else { Granularity::Monthly };
            let start = d(2000, 1, 1) + Days::new(start_off);
            let end = start + Days::new(span);
            let seq = build_sequence(start, end, granularity).unwrap();

            prop_assert!(!seq.is_empty());
            prop_assert_eq!(seq.first_anchor().unwrap(), granularity.period_start(start));
            prop_assert_eq!(seq.last_anchor().unwrap(), granularity.period_start(end));
            for pair in seq.anchors.windows(2) {
                prop_assert_eq!(granularity.advance(pair[0]).unwrap(), pair[1]);
            }
            for (label, anchor) in seq.labels.iter().zip(&seq.anchors) {
                prop_assert_eq!(granularity.parse_label(label).unwrap(), *anchor);
            }
        }
    }
}
