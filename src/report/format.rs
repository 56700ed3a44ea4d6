//! Formatted terminal output for a forecast view.
//!
//! Formatting lives here so the period and pipeline code stays presentation
//! free. Every line is right-trimmed, which keeps golden tests stable.

use crate::app::pipeline::ForecastView;
use crate::domain::{Boundary, EditClass};
use crate::report::MetricTotals;

const NAME_WIDTH: usize = 18;
const COL_WIDTH: usize = 8;

/// Header block: granularity, today, boundary and the editable period.
pub fn format_summary(view: &ForecastView, totals: &[MetricTotals]) -> String {
    let mut out = String::new();

    out.push_str("=== dp - Demand Periods ===\n");
    out.push_str(&format!("Granularity: {}\n", view.granularity));
    out.push_str(&format!("Today: {}\n", view.today));

    match (view.labels.first(), view.labels.last()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("Periods: {} ({first} .. {last})\n", view.labels.len()));
        }
        _ => out.push_str("Periods: 0\n"),
    }

    match view.boundary {
        Boundary::At(idx) => out.push_str(&format!(
            "Boundary: {idx} ({})\n",
            view.labels.get(idx).map(String::as_str).unwrap_or("?")
        )),
        Boundary::BeforeStart => out.push_str("Boundary: -1 (all periods in the future)\n"),
    }

    match view.editable_index() {
        Some(idx) => out.push_str(&format!("Editable: {idx} ({})\n", view.labels[idx])),
        None => out.push_str("Editable: none\n"),
    }

    if !totals.is_empty() {
        out.push_str("\nTotals:\n");
        out.push_str(&trimmed(format!(
            "{:<NAME_WIDTH$} {:>12} {:>12}",
            "metric", "historical", "forecast"
        )));
        for t in totals {
            out.push_str(&trimmed(format!(
                "{:<NAME_WIDTH$} {:>12} {:>12}",
                truncate(t.metric.display_name(), NAME_WIDTH),
                fmt_opt(t.historical),
                fmt_opt(t.forecast),
            )));
        }
    }
    out.push('\n');

    out
}

/// Period table: one column per label, a status row, then one row per metric.
///
/// Status markers: `past` and `now` are locked, `edit` is the editable
/// period, future periods are left blank.
pub fn format_view_table(view: &ForecastView) -> String {
    let mut out = String::new();

    out.push_str(&table_line("Period", view.labels.iter().map(|l| truncate(l, COL_WIDTH))));
    out.push_str(&table_line("Status", view.classes.iter().map(|c| status_marker(*c).to_string())));
    out.push_str(&"-".repeat(NAME_WIDTH + view.labels.len() * (COL_WIDTH + 1)));
    out.push('\n');

    for row in &view.rows {
        out.push_str(&table_line(row.metric.display_name(), row.values.iter().map(|v| fmt_opt(*v))));
    }

    out
}

fn table_line(name: &str, cells: impl Iterator<Item = String>) -> String {
    let mut line = format!("{:<NAME_WIDTH$}", truncate(name, NAME_WIDTH));
    for cell in cells {
        line.push_str(&format!(" {cell:>COL_WIDTH$}"));
    }
    trimmed(line)
}

fn trimmed(line: String) -> String {
    let mut out = line.trim_end().to_string();
    out.push('\n');
    out
}

fn status_marker(class: EditClass) -> &'static str {
    match class {
        EditClass::Past => "past",
        EditClass::Current => "now",
        EditClass::Editable => "edit",
        EditClass::Future => "",
    }
}

/// Whole numbers print without decimals; "no data" prints as `-`.
fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
