//! REST API integration for per-period demand values.

use reqwest::blocking::Client;

use crate::app::pipeline::ForecastRequest;
use crate::domain::MetricValueMap;
use crate::error::AppError;
use crate::io::ingest::{ForecastPayload, warn_cell_errors};

const ENV_URL: &str = "DEMAND_API_URL";
const ENV_TOKEN: &str = "DEMAND_API_TOKEN";
const FORECAST_PATH: &str = "forecast";

pub struct DemandApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl DemandApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(ENV_URL).map_err(|_| {
            AppError::new(
                2,
                format!("Missing {ENV_URL} in environment (.env). Use --input or --sample to run offline."),
            )
        })?;
        let token = std::env::var(ENV_TOKEN).ok().filter(|t| !t.trim().is_empty());
        Ok(Self::new(base_url, token))
    }

    /// Whether an API endpoint is configured (after loading `.env`).
    pub fn is_configured() -> bool {
        dotenvy::dotenv().ok();
        std::env::var(ENV_URL).is_ok_and(|v| !v.trim().is_empty())
    }

    pub fn fetch_values(&self, request: &ForecastRequest) -> Result<MetricValueMap, AppError> {
        let url = forecast_url(&self.base_url);
        tracing::debug!(%url, start = %request.start, end = %request.end, "fetching forecast values");

        let mut req = self.client.get(&url).query(&[
            ("start", request.start.to_string()),
            ("end", request.end.to_string()),
            ("granularity", request.granularity.as_str().to_string()),
        ]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("Forecast API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Forecast API request failed with status {}.", resp.status()),
            ));
        }

        let body: ForecastPayload = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse forecast API response: {e}")))?;

        let (values, cell_errors) = body.into_values();
        warn_cell_errors(&cell_errors);
        tracing::info!(periods = values.len(), cell_errors = cell_errors.len(), "fetched forecast values");
        Ok(values)
    }
}

fn forecast_url(base_url: &str) -> String {
    format!("{}/{FORECAST_PATH}", base_url.trim().trim_end_matches('/'))
}
