//! Forecast retrieval from the `OpenMeteo` API
//!
//! Requests current conditions plus a daily series in °F, mph and inches
//! with the timezone auto-detected. Any transport failure, non-success
//! status or unreadable body is reported as `None`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::ForecastConfig;
use crate::models::RawForecast;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";

/// Fetches raw forecasts for a coordinate
#[async_trait]
pub trait ForecastClient: Send + Sync {
    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Option<RawForecast>;
}

/// `OpenMeteo` forecast client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    forecast_days: u8,
}

impl OpenMeteoClient {
    /// Create a new forecast client
    pub fn new(config: &ForecastConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| crate::ServiceError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
        })
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current={}&daily={}&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch&timezone=auto&forecast_days={}",
            self.base_url, latitude, longitude, CURRENT_FIELDS, DAILY_FIELDS, self.forecast_days
        )
    }
}

#[async_trait]
impl ForecastClient for OpenMeteoClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Option<RawForecast> {
        info!(
            "Getting forecast for coordinates: {:.4}, {:.4}",
            latitude, longitude
        );
        let start_time = Instant::now();

        let url = self.forecast_url(latitude, longitude);
        debug!("OpenMeteo API request URL: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Forecast request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Forecast API returned status {}", status);
            return None;
        }

        let forecast: RawForecast = match response.json().await {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("Failed to parse OpenMeteo forecast response: {}", e);
                return None;
            }
        };

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast with {} daily entries in {:.3}s",
            forecast.daily.time.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() >= 2 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Some(forecast)
    }
}
