//! Address forecast - free-text address to multi-day weather forecast
//!
//! This library geocodes an address, fetches and formats a forecast for the
//! resulting coordinate, and serves repeat lookups from a 30 minute cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod forecast_resolver;
pub mod formatter;
pub mod geocoding;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use crate::cache::{Clock, FORECAST_TTL, ForecastCache, MemoryCache, SystemClock};
pub use crate::config::AppConfig;
pub use crate::error::{ResolveError, ServiceError};
pub use crate::forecast_resolver::ForecastResolver;
pub use crate::formatter::ForecastFormatter;
pub use crate::geocoding::{GeocodingClient, NominatimClient};
pub use crate::models::{Coordinate, DailyForecast, ForecastRecord, RawForecast, Suggestion};
pub use crate::normalize::{CacheKey, normalize};
pub use crate::weather::{ForecastClient, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ServiceError>;
