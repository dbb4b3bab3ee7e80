//! Forward geocoding against Nominatim (OpenStreetMap)
//!
//! Every failure mode (no results, HTTP error, timeout, unreadable body)
//! collapses into `None` or an empty list here. Callers cannot tell them
//! apart, only the logs can.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::{Coordinate, Suggestion};

/// Maximum number of autocomplete suggestions
pub const SUGGESTION_LIMIT: usize = 5;

/// Resolves addresses to coordinates
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Best single match for an address, `None` when nothing usable came back
    async fn geocode(&self, address: &str) -> Option<Coordinate>;

    /// Up to [`SUGGESTION_LIMIT`] matches for a partial address, never cached
    async fn search_suggestions(&self, query: &str) -> Vec<Suggestion>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    region: Option<String>,
    province: Option<String>,
    country: Option<String>,
}

/// Build the short label for a place: settlement, then region, then country.
///
/// Falls back to the provider's display string when none of those exist.
fn format_location_name(place: &NominatimPlace) -> String {
    let Some(addr) = &place.address else {
        return place.display_name.clone();
    };

    let settlement = addr
        .city
        .as_ref()
        .or(addr.town.as_ref())
        .or(addr.village.as_ref())
        .or(addr.hamlet.as_ref());
    let region = addr
        .state
        .as_ref()
        .or(addr.region.as_ref())
        .or(addr.province.as_ref());

    let parts: Vec<&str> = [settlement, region, addr.country.as_ref()]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    if parts.is_empty() {
        place.display_name.clone()
    } else {
        parts.join(", ")
    }
}

impl NominatimPlace {
    fn to_coordinate(&self) -> Option<Coordinate> {
        let latitude = self.lat.trim().parse::<f64>().ok()?;
        let longitude = self.lon.trim().parse::<f64>().ok()?;
        Some(Coordinate::new(
            latitude,
            longitude,
            format_location_name(self),
        ))
    }

    fn to_suggestion(&self) -> Suggestion {
        Suggestion {
            display_name: format_location_name(self),
            full_address: self.display_name.clone(),
        }
    }
}

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    suggestion_timeout: Duration,
}

impl NominatimClient {
    /// Create a new geocoding client
    pub fn new(config: &GeocodingConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| crate::ServiceError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            suggestion_timeout: Duration::from_millis(config.suggestion_timeout_ms),
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/search?q={}&format=json&limit={}&addressdetails=1",
            self.base_url,
            urlencoding::encode(query),
            limit
        )
    }

    /// Run one search request. Errors are logged and returned as text.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<NominatimPlace>, String> {
        let start_time = Instant::now();
        let mut request = self.client.get(self.search_url(query, limit));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("Nominatim returned status {status}"));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| e.to_string())?;
        debug!(
            "Nominatim returned {} places for '{}' in {:.3}s",
            places.len(),
            query,
            start_time.elapsed().as_secs_f64()
        );
        Ok(places)
    }
}

#[async_trait]
impl GeocodingClient for NominatimClient {
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, address: &str) -> Option<Coordinate> {
        let places = match self.search(address, 1, None).await {
            Ok(places) => places,
            Err(e) => {
                error!("Nominatim geocoding error: {}", e);
                return None;
            }
        };

        let Some(place) = places.first() else {
            warn!("No results found for address '{}'", address);
            return None;
        };

        let coordinate = place.to_coordinate();
        match &coordinate {
            Some(c) => info!(
                "Geocoded '{}' to {} ({})",
                address,
                c.location_name,
                c.format_coordinates()
            ),
            None => error!(
                "Nominatim geocoding error: unreadable coordinates lat='{}' lon='{}'",
                place.lat, place.lon
            ),
        }
        coordinate
    }

    #[instrument(skip(self), level = "debug")]
    async fn search_suggestions(&self, query: &str) -> Vec<Suggestion> {
        match self
            .search(query, SUGGESTION_LIMIT, Some(self.suggestion_timeout))
            .await
        {
            Ok(places) => places
                .iter()
                .take(SUGGESTION_LIMIT)
                .map(NominatimPlace::to_suggestion)
                .collect(),
            Err(e) => {
                error!("Nominatim search suggestions error: {}", e);
                Vec::new()
            }
        }
    }
}
