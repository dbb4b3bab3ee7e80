//! Address to forecast resolution
//!
//! normalize → cache lookup → (miss) geocode → fetch → format → store.
//! Every lookup ends in a complete [`ForecastRecord`] or a [`ResolveError`];
//! nothing below this boundary is allowed to escape as anything else.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{Clock, FORECAST_TTL, ForecastCache, SystemClock};
use crate::error::ResolveError;
use crate::formatter::ForecastFormatter;
use crate::geocoding::GeocodingClient;
use crate::models::{ForecastRecord, Suggestion};
use crate::normalize::{CacheKey, normalize};
use crate::weather::ForecastClient;

/// Shortest query forwarded to the suggestion provider
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

/// Service for resolving addresses into forecasts
#[derive(Clone)]
pub struct ForecastResolver {
    geocoder: Arc<dyn GeocodingClient>,
    forecasts: Arc<dyn ForecastClient>,
    cache: Arc<dyn ForecastCache>,
    clock: Arc<dyn Clock>,
}

impl ForecastResolver {
    pub fn new(
        geocoder: Arc<dyn GeocodingClient>,
        forecasts: Arc<dyn ForecastClient>,
        cache: Arc<dyn ForecastCache>,
    ) -> Self {
        Self {
            geocoder,
            forecasts,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different time source for `cached_at` stamps
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resolve an address into a forecast.
    ///
    /// Cache hits come back with `from_cache = true` and the timestamp of the
    /// original fetch; they never extend the entry's lifetime. Blank
    /// addresses are the caller's to reject.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve(&self, address: &str) -> Result<ForecastRecord, ResolveError> {
        let key = normalize(address);

        match self.cache.read(&key).await {
            Ok(Some(cached)) => {
                info!("Weather data served from cache for: {}", address);
                return Ok(cached.served_from_cache());
            }
            Ok(None) => debug!("Cache miss for {}", key.namespaced()),
            Err(e) => {
                warn!("Weather service error for '{}': {}", address, e);
                return Err(e.into());
            }
        }

        info!("Fetching fresh weather data for: {}", address);
        let result = self.fetch_and_store(address, &key).await;
        if let Err(e) = &result {
            warn!(
                "Forecast lookup for '{}' failed ({}): {}",
                address,
                e.error_kind(),
                e
            );
        }
        result
    }

    async fn fetch_and_store(
        &self,
        address: &str,
        key: &CacheKey,
    ) -> Result<ForecastRecord, ResolveError> {
        let coordinate = self
            .geocoder
            .geocode(address)
            .await
            .ok_or(ResolveError::LocationNotFound)?;

        let raw = self
            .forecasts
            .fetch_forecast(coordinate.latitude, coordinate.longitude)
            .await
            .ok_or(ResolveError::ForecastUnavailable)?;

        let record = ForecastFormatter::format(&raw, &coordinate.location_name)?
            .fetched_at(self.clock.now());

        self.cache.write(key, record.clone(), FORECAST_TTL).await?;
        info!("Weather data cached for: {}", address);

        Ok(record)
    }

    /// Drop the cached forecast for one address.
    ///
    /// Returns whether a live entry was removed. Other addresses are untouched
    /// unless they normalize to the same key.
    pub async fn invalidate(&self, address: &str) -> Result<bool, ResolveError> {
        let key = normalize(address);
        let removed = self.cache.delete(&key).await?;
        info!("Cache cleared for {} (removed: {})", address, removed);
        Ok(removed)
    }

    /// Drop every cached forecast
    pub async fn clear_all(&self) -> Result<(), ResolveError> {
        self.cache.clear().await?;
        info!("All weather cache cleared");
        Ok(())
    }

    /// Address suggestions for a partial query.
    ///
    /// Blank or too-short queries skip the provider. The length counts the
    /// query as typed and the query is forwarded untrimmed.
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        if query.trim().is_empty() || query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return Vec::new();
        }
        self.geocoder.search_suggestions(query).await
    }
}
