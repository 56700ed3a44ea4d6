//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`Granularity`, `Fallback`)
//! - the externally supplied value map (`Metric`, `MetricValueMap`)
//! - period outputs (`Boundary`, `StitchedSeries`, `EditClass`)

pub mod types;

pub use types::*;
