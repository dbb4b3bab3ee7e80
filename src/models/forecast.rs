//! Formatted forecast record returned to callers

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One day of the multi-day outlook
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    /// Long weekday, month and day, e.g. "Friday, August 01"
    pub date: String,
    /// High temperature in °F
    pub high: i64,
    /// Low temperature in °F
    pub low: i64,
    pub description: String,
    pub icon: String,
}

/// Forecast for one resolved address
///
/// Values are in °F, mph and percent. `from_cache` and `cached_at` are the
/// only fields that differ between a fresh and a cached copy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastRecord {
    #[serde(rename = "location")]
    pub location_name: String,
    pub current_temp: i64,
    pub feels_like: i64,
    pub description: String,
    /// Relative humidity in percent
    pub humidity: i64,
    /// Wind speed in mph, one decimal place
    pub wind_speed: f64,
    pub icon: String,
    pub today_high: i64,
    pub today_low: i64,
    /// At most five days, starting today
    pub daily_forecast: Vec<DailyForecast>,
    pub from_cache: bool,
    /// RFC 3339 time the record was fetched and stored
    pub cached_at: String,
}

impl ForecastRecord {
    /// Stamp a freshly fetched record
    #[must_use]
    pub fn fetched_at(mut self, now: DateTime<Utc>) -> Self {
        self.from_cache = false;
        self.cached_at = format_timestamp(now);
        self
    }

    /// Mark a stored record as served from the cache, keeping its original timestamp
    #[must_use]
    pub fn served_from_cache(mut self) -> Self {
        self.from_cache = true;
        self
    }
}

/// Format a timestamp the way `cached_at` is rendered
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
