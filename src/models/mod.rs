//! Data models for the address forecast service
//!
//! - Location: geocoded coordinates and autocomplete suggestions
//! - Forecast: the formatted forecast record handed to callers
//! - Open-Meteo: raw provider payload as it arrives on the wire

pub mod forecast;
pub mod location;
pub mod open_meteo;

pub use forecast::{DailyForecast, ForecastRecord};
pub use location::{Coordinate, Suggestion};
pub use open_meteo::{CurrentConditions, DailySeries, RawForecast};
