//! Error types for the address forecast service
//!
//! Two layers live here: [`ServiceError`] for infrastructure failures
//! (configuration, cache, payload formatting) and [`ResolveError`], the
//! closed set of outcomes a forecast lookup can end in.

use thiserror::Error;

/// Infrastructure error shared by the cache, formatter and configuration
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP client could not be built for a provider
    #[error("API error: {message}")]
    Api { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Provider payload could not be turned into a forecast
    #[error("Format error: {message}")]
    Format { message: String },
}

impl ServiceError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Outcome of a failed forecast lookup
///
/// The messages are user facing and stable; callers match on the variant,
/// never on the text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Could not find location for the given address")]
    LocationNotFound,

    #[error("Unable to fetch weather data")]
    ForecastUnavailable,

    #[error("Weather service error: {0}")]
    Internal(String),
}

impl ResolveError {
    /// Short machine-readable name of the variant
    #[must_use]
    pub fn error_kind(&self) -> &'static str {
        match self {
            ResolveError::LocationNotFound => "location_not_found",
            ResolveError::ForecastUnavailable => "forecast_unavailable",
            ResolveError::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for ResolveError {
    fn from(err: ServiceError) -> Self {
        ResolveError::Internal(err.to_string())
    }
}
