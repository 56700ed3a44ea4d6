//! Conversions between calendar dates and period labels.
//!
//! Two label forms exist:
//! - monthly: `"{MonShort} {YY}"`, e.g. `"Dec 24"` (the date's own month/year)
//! - weekly: `"{isoYear}-W{week:02}"`, e.g. `"2025-W01"` (ISO-8601 week numbering)
//!
//! Parsing is the inverse of formatting and returns the period's anchor date:
//! the first of the month, or the Monday of the ISO week.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::domain::Granularity;
use crate::error::PeriodError;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// ISO-8601 week label of `date`.
///
/// The week-year is the calendar year of the Thursday in the same week, so
/// late-December dates can belong to week 1 of the next year and early-January
/// dates to week 52/53 of the previous one.
pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Month label of `date` (calendar month, not ISO).
pub fn month_label(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{month} {:02}", date.year().rem_euclid(100))
}

/// Parse `"MMM YY"` back to the first day of that month (year `2000 + YY`).
pub fn parse_month_label(label: &str) -> Result<NaiveDate, PeriodError> {
    let malformed = || PeriodError::malformed(label, Granularity::Monthly);

    let mut tokens = label.split_whitespace();
    let (Some(month), Some(yy), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let month0 = MONTHS.iter().position(|m| *m == month).ok_or_else(malformed)?;
    if yy.len() != 2 || !yy.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let yy: i32 = yy.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(2000 + yy, month0 as u32 + 1, 1).ok_or_else(malformed)
}

/// Parse `"YYYY-Www"` back to the Monday of that ISO week.
///
/// Week numbers that do not exist in the given ISO year (`W00`, or `W53` in a
/// 52-week year) are rejected rather than rolled into the neighbouring year.
pub fn parse_week_label(label: &str) -> Result<NaiveDate, PeriodError> {
    let malformed = || PeriodError::malformed(label, Granularity::Weekly);

    let (year, week) = label.trim().split_once("-W").ok_or_else(malformed)?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if week.len() != 2 || !week.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let year: i32 = year.parse().map_err(|_| malformed())?;
    let week: u32 = week.parse().map_err(|_| malformed())?;

    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(malformed)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Absolute month number (`year * 12 + month0`), used for distance comparisons.
pub fn month_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

impl Granularity {
    /// Label of the period containing `date`.
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Granularity::Monthly => month_label(date),
            Granularity::Weekly => iso_week_label(date),
        }
    }

    /// Anchor date (month start or ISO Monday) of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Monthly => month_start(date),
            Granularity::Weekly => week_start(date),
        }
    }

    /// Anchor date of a label of this granularity.
    pub fn parse_label(self, label: &str) -> Result<NaiveDate, PeriodError> {
        match self {
            Granularity::Monthly => parse_month_label(label),
            Granularity::Weekly => parse_week_label(label),
        }
    }

    /// Anchor of the period following the one anchored at `anchor`.
    ///
    /// `None` only at the end of chrono's representable range.
    pub fn advance(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Monthly => anchor.checked_add_months(Months::new(1)),
            Granularity::Weekly => anchor.checked_add_days(Days::new(7)),
        }
    }

    /// Anchor of the period preceding the one anchored at `anchor`.
    pub fn retreat(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Monthly => anchor.checked_sub_months(Months::new(1)),
            Granularity::Weekly => anchor.checked_sub_days(Days::new(7)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_label_rolls_into_next_iso_year() {
        // 2024-12-30 is a Monday whose Thursday is 2025-01-02.
        assert_eq!(iso_week_label(d(2024, 12, 30)), "2025-W01");
        assert_eq!(iso_week_label(d(2024, 12, 29)), "2024-W52");
    }

    #[test]
    fn week_label_covers_53_week_years() {
        assert_eq!(iso_week_label(d(2020, 12, 28)), "2020-W53");
        assert_eq!(iso_week_label(d(2021, 1, 3)), "2020-W53");
        assert_eq!(iso_week_label(d(2021, 1, 4)), "2021-W01");
        assert_eq!(iso_week_label(d(2026, 12, 31)), "2026-W53");
        assert_eq!(parse_week_label("2026-W53").unwrap(), d(2026, 12, 28));
    }

    #[test]
    fn week_53_rejected_in_52_week_year() {
        assert!(matches!(
            parse_week_label("2021-W53"),
            Err(PeriodError::MalformedLabel { .. })
        ));
        assert!(parse_week_label("2021-W00").is_err());
    }

    #[test]
    fn parse_week_label_returns_monday() {
        assert_eq!(parse_week_label("2025-W01").unwrap(), d(2024, 12, 30));
        assert_eq!(parse_week_label("2024-W52").unwrap(), d(2024, 12, 23));
    }

    #[test]
    fn parse_week_label_rejects_malformed_input() {
        for bad in ["", "2024W05", "2024-W5", "24-W05", "2024-w05", "2024-W05x", "abcd-W01"] {
            let err = parse_week_label(bad).unwrap_err();
            assert_eq!(
                err,
                PeriodError::MalformedLabel {
                    label: bad.to_string(),
                    granularity: Granularity::Weekly
                },
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn month_label_uses_calendar_year() {
        assert_eq!(month_label(d(2024, 12, 30)), "Dec 24");
        assert_eq!(month_label(d(2025, 1, 1)), "Jan 25");
        assert_eq!(month_label(d(2009, 7, 15)), "Jul 09");
    }

    #[test]
    fn parse_month_label_basic() {
        assert_eq!(parse_month_label("Dec 24").unwrap(), d(2024, 12, 1));
        assert_eq!(parse_month_label("Jan 05").unwrap(), d(2005, 1, 1));
    }

    #[test]
    fn parse_month_label_rejects_malformed_input() {
        for bad in ["", "Dec", "Dec 24 x", "Foo 24", "dec 24", "Dec 2024", "Dec x4"] {
            assert!(parse_month_label(bad).is_err(), "input {bad:?}");
        }
    }

    #[test]
    fn period_start_normalizes() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(week_start(d(2024, 11, 15)), d(2024, 11, 11));
        assert_eq!(week_start(d(2024, 11, 11)), d(2024, 11, 11));
        assert_eq!(week_start(d(2024, 11, 17)), d(2024, 11, 11));
    }

    #[test]
    fn advance_and_retreat_step_one_period() {
        assert_eq!(Granularity::Monthly.advance(d(2024, 12, 1)), Some(d(2025, 1, 1)));
        assert_eq!(Granularity::Weekly.advance(d(2024, 12, 30)), Some(d(2025, 1, 6)));
        assert_eq!(Granularity::Monthly.retreat(d(2025, 1, 1)), Some(d(2024, 12, 1)));
        assert_eq!(Granularity::Weekly.retreat(d(2025, 1, 6)), Some(d(2024, 12, 30)));
    }

    proptest! {
        #[test]
        fn week_label_round_trips_for_mondays(weeks in 0u64..6000) {
            // 2000-01-03 is a Monday.
            let monday = d(2000, 1, 3) + Days::new(weeks * 7);
            prop_assert_eq!(parse_week_label(&iso_week_label(monday)).unwrap(), monday);
        }

        #[test]
        fn month_label_round_trips_for_month_starts(year in 2000i32..2100, month in 1u32..=12) {
            let first = d(year, month, 1);
            prop_assert_eq!(parse_month_label(&month_label(first)).unwrap(), first);
        }
    }
}
