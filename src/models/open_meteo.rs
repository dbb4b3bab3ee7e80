//! `OpenMeteo` forecast response structures
//!
//! Only the fields requested by the forecast client are modelled. Daily
//! series are parallel arrays indexed by day offset and may contain nulls.

use serde::{Deserialize, Serialize};

/// Forecast response from the `OpenMeteo` API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawForecast {
    pub current: CurrentConditions,
    pub daily: DailySeries,
}

/// Current conditions block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "apparent_temperature")]
    pub feels_like: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: f64,
    pub weather_code: i32,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
}

/// Daily series block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<Option<String>>,
    #[serde(rename = "temperature_2m_max", default)]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    pub temperature_min: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}
