//! Hotel model for accommodation records

use super::Coordinates;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Accommodation record as held by a hotel catalog
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rating from 0.0 to 5.0
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub has_restaurant: bool,
    #[serde(default)]
    pub has_pool: bool,
    #[serde(default)]
    pub has_spa: bool,
    #[serde(default)]
    pub has_gym: bool,
    #[serde(default = "default_true")]
    pub has_free_wifi: bool,
}

impl HotelRecord {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Hotel paired with its distance from a search point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NearbyHotel {
    pub hotel: HotelRecord,
    pub distance_km: f64,
}
