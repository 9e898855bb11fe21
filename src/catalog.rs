//! File-backed attraction and hotel catalog
//!
//! A catalog is a JSON document listing destinations together with their
//! attractions and hotels:
//!
//! ```json
//! { "destinations": [ { "id": 1, "name": "Paris", "country": "France",
//!                       "attractions": [...], "hotels": [...] } ] }
//! ```

use crate::distance::haversine;
use crate::models::{
    AttractionRecord, Coordinates, DestinationSummary, HotelRecord, HotelSummary, ItineraryDetails,
    NearbyHotel, SavedItinerary,
};
use crate::planner::{AttractionSource, HotelLocator};
use crate::scheduler::DayScheduler;
use crate::{Result, TripPlanError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// 0 to 10; destination listings are ordered by it
    #[serde(default)]
    pub popularity_score: f64,
    #[serde(default)]
    pub attractions: Vec<AttractionRecord>,
    #[serde(default)]
    pub hotels: Vec<HotelRecord>,
}

impl Destination {
    /// Case-insensitive substring match on name or country
    fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .country
                .as_deref()
                .is_some_and(|country| country.to_lowercase().contains(&term))
    }

    #[must_use]
    pub fn summary(&self) -> DestinationSummary {
        DestinationSummary {
            id: self.id,
            name: self.name.clone(),
            country: self.country.clone(),
        }
    }
}

/// Optional constraints on a destination's attractions. Unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttractionFilter {
    /// Keep attractions whose category is one of these
    pub categories: Vec<String>,
    /// Keep attractions priced at or below this; unpriced ones are excluded
    pub max_price_range: Option<u8>,
    pub must_visit_only: bool,
}

impl AttractionFilter {
    fn accepts(&self, attraction: &AttractionRecord) -> bool {
        if !self.categories.is_empty() {
            let Some(category) = &attraction.category else {
                return false;
            };
            if !self.categories.contains(category) {
                return false;
            }
        }
        if self
            .max_price_range
            .is_some_and(|max| attraction.price_range.is_none_or(|price| price > max))
        {
            return false;
        }
        !self.must_visit_only || attraction.is_must_visit
    }
}

/// Optional constraints on a destination's hotels. Amenity flags only
/// narrow the result when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelFilter {
    pub min_rating: Option<f64>,
    /// Hotels without a listed price are excluded when this is set
    pub max_price: Option<f64>,
    pub has_restaurant: bool,
    pub has_pool: bool,
    pub has_gym: bool,
    pub has_spa: bool,
}

impl HotelFilter {
    fn accepts(&self, hotel: &HotelRecord) -> bool {
        if self.min_rating.is_some_and(|min| hotel.rating < min) {
            return false;
        }
        if self
            .max_price
            .is_some_and(|max| hotel.price_per_night.is_none_or(|price| price > max))
        {
            return false;
        }
        (!self.has_restaurant || hotel.has_restaurant)
            && (!self.has_pool || hotel.has_pool)
            && (!self.has_gym || hotel.has_gym)
            && (!self.has_spa || hotel.has_spa)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TripPlanError::catalog(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            destinations = catalog.destinations.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        for destination in &self.destinations {
            let duplicates = self
                .destinations
                .iter()
                .filter(|d| d.id == destination.id)
                .count();
            if duplicates > 1 {
                return Err(TripPlanError::catalog(format!(
                    "Destination id {} appears {duplicates} times",
                    destination.id
                )));
            }

            let points = destination
                .attractions
                .iter()
                .map(|a| (a.name.as_str(), a.coordinates()))
                .chain(destination.hotels.iter().map(|h| (h.name.as_str(), h.coordinates())));
            for (name, point) in points {
                if !point.is_valid() {
                    return Err(TripPlanError::catalog(format!(
                        "{name} in {} has invalid coordinates {}",
                        destination.name,
                        point.format_coordinates()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn destination(&self, id: i64) -> Result<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| TripPlanError::catalog(format!("Unknown destination {id}")))
    }

    /// Destinations whose name or country contains `term` (case-insensitive),
    /// most popular first. Without a term every destination is listed.
    pub fn search_destinations(&self, term: Option<&str>) -> Vec<&Destination> {
        let mut found: Vec<&Destination> = self
            .destinations
            .iter()
            .filter(|d| term.is_none_or(|term| d.matches(term)))
            .collect();
        found.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
        found
    }

    /// All attractions of a destination in catalog order
    pub fn attractions(&self, destination_id: i64) -> Result<&[AttractionRecord]> {
        Ok(&self.destination(destination_id)?.attractions)
    }

    /// Must-visit attractions first, then by descending rating
    pub fn ranked_attractions(&self, destination_id: i64, limit: usize) -> Result<Vec<AttractionRecord>> {
        let attractions = self.attractions(destination_id)?;
        Ok(DayScheduler::prioritize(attractions)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    /// Attractions passing `filter`, must-visit first, then by descending rating
    pub fn filtered_attractions(
        &self,
        destination_id: i64,
        filter: &AttractionFilter,
    ) -> Result<Vec<AttractionRecord>> {
        let attractions = self.attractions(destination_id)?;
        let matching: Vec<AttractionRecord> = attractions
            .iter()
            .filter(|a| filter.accepts(a))
            .cloned()
            .collect();
        debug!(destination_id, total = attractions.len(), matching = matching.len(), ?filter, "Filtered attractions");
        Ok(DayScheduler::prioritize(&matching).into_iter().cloned().collect())
    }

    /// Hotels passing `filter`, highest rated first
    pub fn filtered_hotels(&self, destination_id: i64, filter: &HotelFilter) -> Result<Vec<HotelRecord>> {
        let destination = self.destination(destination_id)?;
        let mut matching: Vec<HotelRecord> = destination
            .hotels
            .iter()
            .filter(|h| filter.accepts(h))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        debug!(destination_id, matching = matching.len(), ?filter, "Filtered hotels");
        Ok(matching)
    }

    /// Any destination's hotel with this id
    pub fn hotel(&self, id: i64) -> Option<&HotelRecord> {
        self.destinations
            .iter()
            .flat_map(|d| &d.hotels)
            .find(|h| h.id == id)
    }

    /// Hotels within `max_distance_km` of `point`, nearest first
    pub fn hotels_near_point(
        &self,
        destination_id: i64,
        point: Coordinates,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyHotel>> {
        let destination = self.destination(destination_id)?;
        let mut nearby: Vec<NearbyHotel> = destination
            .hotels
            .iter()
            .map(|hotel| NearbyHotel {
                distance_km: haversine(point.latitude, point.longitude, hotel.latitude, hotel.longitude),
                hotel: hotel.clone(),
            })
            .filter(|n| n.distance_km <= max_distance_km)
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(limit);

        debug!(
            destination = destination.name,
            found = nearby.len(),
            max_distance_km,
            "Hotel proximity search"
        );
        Ok(nearby)
    }

    /// Attach destination and hotel details to a saved itinerary
    #[must_use]
    pub fn resolve_details(&self, saved: SavedItinerary) -> ItineraryDetails {
        let destination = self
            .destinations
            .iter()
            .find(|d| d.id == saved.itinerary.destination_id)
            .map(Destination::summary);
        let hotel = saved
            .itinerary
            .hotel_id
            .and_then(|id| self.hotel(id))
            .map(HotelSummary::from);

        ItineraryDetails {
            id: saved.id,
            destination,
            hotel,
            itinerary: saved.itinerary,
        }
    }
}

#[async_trait]
impl AttractionSource for Catalog {
    async fn top_attractions(&self, destination_id: i64, limit: usize) -> Result<Vec<AttractionRecord>> {
        self.ranked_attractions(destination_id, limit)
    }
}

#[async_trait]
impl HotelLocator for Catalog {
    async fn hotels_near(
        &self,
        destination_id: i64,
        point: Coordinates,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyHotel>> {
        self.hotels_near_point(destination_id, point, max_distance_km, limit)
    }
}
