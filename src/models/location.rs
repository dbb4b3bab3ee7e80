//! Geocoded locations and address suggestions

use serde::{Deserialize, Serialize};

/// Best geocoding match for an address
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Human-readable label, e.g. "Vancouver, British Columbia, Canada"
    pub location_name: String,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, location_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            location_name: location_name.into(),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One autocomplete entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Short label built from the address components
    pub display_name: String,
    /// Provider's full display string
    pub full_address: String,
}
