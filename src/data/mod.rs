//! Metric value sources: the planning REST API and a synthetic generator.

pub mod api;
pub mod sample;

pub use api::DemandApiClient;
pub use sample::generate_sample;
