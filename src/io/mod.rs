//! Input/output helpers.
//!
//! - metric value ingest from JSON/CSV (`ingest`)
//! - view exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
