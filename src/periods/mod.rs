//! Period bucketing and series stitching.
//!
//! Pure, synchronous transformations from `(range, granularity, raw values)`
//! to `(labels, series, classifications)`:
//!
//! - `calendar`: date <-> label conversions (monthly and ISO-week)
//! - `buckets`: gap-free label sequences for a date range
//! - `boundary`: index of "the current period" (today is always injected)
//! - `stitch`: historical/forecast split with a bridge point
//! - `window`: locked / editable classification

pub mod boundary;
pub mod buckets;
pub mod calendar;
pub mod stitch;
pub mod window;

pub use boundary::{find_boundary, find_monthly_boundary, find_weekly_boundary};
pub use buckets::{build_monthly_labels, build_sequence, build_weekly_labels, PeriodSequence};
pub use calendar::{iso_week_label, month_label, parse_month_label, parse_week_label};
pub use stitch::{split_consensus_future, split_historical_future};
pub use window::{classify, editable_index, ensure_editable};
