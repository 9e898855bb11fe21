//! Attraction model for points of interest

use serde::{Deserialize, Serialize};

/// Visit length assumed when a record does not carry one
pub const DEFAULT_VISIT_DURATION_MINUTES: u32 = 120;

fn default_visit_duration() -> u32 {
    DEFAULT_VISIT_DURATION_MINUTES
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite latitude in [-90, 90] and longitude in [-180, 180]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A point of interest as supplied by the caller. Read-only to the planner.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AttractionRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Rating from 0.0 to 5.0
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub is_must_visit: bool,
    #[serde(default = "default_visit_duration")]
    pub visit_duration_minutes: u32,
    /// e.g. "Museum", "Temple"
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 1 (cheap) to 5 (expensive)
    #[serde(default)]
    pub price_range: Option<u8>,
    /// Carried through as-is; the scheduler does not check opening hours
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
}

impl AttractionRecord {
    /// Create an attraction with the fields the planner reads
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            latitude,
            longitude,
            rating: 0.0,
            is_must_visit: false,
            visit_duration_minutes: DEFAULT_VISIT_DURATION_MINUTES,
            category: None,
            image_url: None,
            price_range: None,
            opening_hours: None,
        }
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    #[must_use]
    pub fn with_visit_duration(mut self, minutes: u32) -> Self {
        self.visit_duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn must_visit(mut self) -> Self {
        self.is_must_visit = true;
        self
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
