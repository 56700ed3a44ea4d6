//! Shared domain types.
//!
//! These types are intentionally kept plain and serializable so they can be:
//!
//! - produced by the period pipeline
//! - exported to JSON/CSV
//! - handed to the table/chart renderers without any behavior attached

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Bucket size of a period sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar months, labelled `"MMM YY"` (e.g. `"Dec 24"`).
    Monthly,
    /// ISO-8601 weeks, labelled `"YYYY-Www"` (e.g. `"2024-W52"`).
    Weekly,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Weekly => "weekly",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Granularity::Monthly => Granularity::Weekly,
            Granularity::Weekly => Granularity::Monthly,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to place "now" when today's period is not in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Fallback {
    /// Closest period by distance; ties go to the earlier period.
    #[default]
    Nearest,
    /// Latest period not after today's period; none means the whole
    /// sequence lies in the future.
    NotAfter,
}

/// A forecast table row.
///
/// The four well-known rows sort first (in display order), optional rows
/// supplied by the API follow alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metric {
    Actual,
    BaselineForecast,
    MlForecast,
    Consensus,
    Other(String),
}

impl Metric {
    pub const KNOWN: [Metric; 4] = [
        Metric::Actual,
        Metric::BaselineForecast,
        Metric::MlForecast,
        Metric::Consensus,
    ];

    pub fn display_name(&self) -> &str {
        match self {
            Metric::Actual => "Actual",
            Metric::BaselineForecast => "Baseline Forecast",
            Metric::MlForecast => "ML Forecast",
            Metric::Consensus => "Consensus",
            Metric::Other(name) => name,
        }
    }

    /// Whether the row is split with the one-period consensus rule.
    pub fn is_consensus(&self) -> bool {
        matches!(self, Metric::Consensus)
    }
}

impl From<String> for Metric {
    fn from(value: String) -> Self {
        match value.trim() {
            "Actual" => Metric::Actual,
            "Baseline Forecast" => Metric::BaselineForecast,
            "ML Forecast" => Metric::MlForecast,
            "Consensus" => Metric::Consensus,
            other => Metric::Other(other.to_string()),
        }
    }
}

impl From<&str> for Metric {
    fn from(value: &str) -> Self {
        Metric::from(value.to_string())
    }
}

impl From<Metric> for String {
    fn from(value: Metric) -> Self {
        value.display_name().to_string()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-period metric values as delivered by the API (`None` = "no data").
///
/// Keyed by period label, then by metric. Read-only input to the pipeline.
pub type MetricValueMap = BTreeMap<String, BTreeMap<Metric, Option<f64>>>;

/// Position of "the current period" inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Every period of the sequence lies after today.
    BeforeStart,
    /// Index of the current period.
    At(usize),
}

impl Boundary {
    /// Integer form used by the rendering layer (`-1` for `BeforeStart`).
    pub fn as_index(self) -> i64 {
        match self {
            Boundary::BeforeStart => -1,
            Boundary::At(idx) => idx as i64,
        }
    }

    /// Whether index `i` is on or before the boundary.
    pub fn is_historical(self, i: usize) -> bool {
        match self {
            Boundary::BeforeStart => false,
            Boundary::At(idx) => i <= idx,
        }
    }

    /// Index of the first period strictly after the boundary.
    pub fn first_future(self) -> usize {
        match self {
            Boundary::BeforeStart => 0,
            Boundary::At(idx) => idx + 1,
        }
    }
}

/// Historical and forecast halves of one metric, both as long as the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchedSeries {
    pub historical: Vec<Option<f64>>,
    pub forecast: Vec<Option<f64>>,
}

impl StitchedSeries {
    /// Index where both halves carry a value (the bridge point), if any.
    pub fn bridge_index(&self) -> Option<usize> {
        self.historical
            .iter()
            .zip(&self.forecast)
            .position(|(h, f)| h.is_some() && f.is_some())
    }
}

/// Editability of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditClass {
    /// Locked, historically immutable.
    Past,
    /// Locked, the period has already started.
    Current,
    /// The single period a planner may change.
    Editable,
    /// Read-only, not yet editable.
    Future,
}

impl EditClass {
    pub fn is_locked(self) -> bool {
        matches!(self, EditClass::Past | EditClass::Current)
    }
}

impl fmt::Display for EditClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EditClass::Past => "Past",
            EditClass::Current => "Current",
            EditClass::Editable => "Editable",
            EditClass::Future => "Future",
        };
        f.write_str(s)
    }
}

/// Where metric values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// REST API configured through the environment.
    Api,
    /// JSON or CSV file on disk.
    File(PathBuf),
    /// Seeded synthetic demand.
    Sample { seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub fallback: Fallback,
    /// Injected "now"; never read from the clock inside the pipeline.
    pub today: NaiveDate,
    pub source: DataSource,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
