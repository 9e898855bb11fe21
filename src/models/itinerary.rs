//! Itinerary model: activities, day schedules and the trip envelope
//!
//! Times cross serialization boundaries as `"HH:MM"` strings and dates as
//! `"YYYY-MM-DD"`; internally they are always `chrono` values.

use super::{Coordinates, HotelRecord};
use crate::{Result, TripPlanError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| TripPlanError::parse(format!("invalid date '{value}' (expected YYYY-MM-DD): {e}")))
}

/// Parse an `HH:MM` clock time
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| TripPlanError::parse(format!("invalid time '{value}' (expected HH:MM): {e}")))
}

/// Serde adapter for `"HH:MM"` clock times
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// What an activity is
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Meal,
    Transfer,
    Attraction,
    FreeTime,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityKind::Meal => "meal",
            ActivityKind::Transfer => "transfer",
            ActivityKind::Attraction => "attraction",
            ActivityKind::FreeTime => "free_time",
        };
        f.write_str(label)
    }
}

/// How a transfer leg is travelled
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    /// Unspecified urban travel at the configured average speed
    Auto,
}

/// One timed unit of a day's plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Activity {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub activity_type: ActivityKind,
    pub attraction_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_location: Option<Coordinates>,
    pub end_location: Option<Coordinates>,
    pub travel_mode: Option<TravelMode>,
    pub travel_duration_minutes: u32,
    pub notes: Option<String>,
}

impl Activity {
    fn base(kind: ActivityKind, start: NaiveTime, end: NaiveTime, title: String) -> Self {
        Self {
            start_time: start,
            end_time: end,
            activity_type: kind,
            attraction_id: None,
            title,
            description: None,
            start_location: None,
            end_location: None,
            travel_mode: None,
            travel_duration_minutes: 0,
            notes: None,
        }
    }

    /// A meal break
    #[must_use]
    pub fn meal(start: NaiveTime, end: NaiveTime, title: &str, description: &str) -> Self {
        let mut activity = Self::base(ActivityKind::Meal, start, end, title.to_string());
        activity.description = Some(description.to_string());
        activity
    }

    /// A travel leg between two places
    #[must_use]
    pub fn transfer(
        start: NaiveTime,
        end: NaiveTime,
        from: Coordinates,
        to: Coordinates,
        destination_name: &str,
        travel_minutes: u32,
    ) -> Self {
        let mut activity = Self::base(
            ActivityKind::Transfer,
            start,
            end,
            format!("Travel to {destination_name}"),
        );
        activity.description = Some(format!(
            "Travel from previous location to {destination_name}"
        ));
        activity.start_location = Some(from);
        activity.end_location = Some(to);
        activity.travel_mode = Some(TravelMode::Auto);
        activity.travel_duration_minutes = travel_minutes;
        activity
    }

    /// A visit to an attraction
    #[must_use]
    pub fn visit(
        start: NaiveTime,
        end: NaiveTime,
        attraction_id: i64,
        name: &str,
        description: Option<String>,
        location: Coordinates,
    ) -> Self {
        let mut activity = Self::base(ActivityKind::Attraction, start, end, format!("Visit {name}"));
        activity.attraction_id = Some(attraction_id);
        activity.description = Some(description.unwrap_or_default());
        activity.start_location = Some(location);
        activity.end_location = Some(location);
        activity
    }

    /// Unplanned time until the end of the day
    #[must_use]
    pub fn free_time(start: NaiveTime, end: NaiveTime) -> Self {
        let mut activity = Self::base(ActivityKind::FreeTime, start, end, "Free time".to_string());
        activity.description =
            Some("Explore the area at your own pace or relax at your hotel".to_string());
        activity
    }

    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// The plan for one calendar day of a trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaySchedule {
    /// 1-based position within the trip
    pub day_number: u32,
    pub date: NaiveDate,
    pub hotel_id: Option<i64>,
    pub activities: Vec<Activity>,
}

impl DaySchedule {
    /// Activities of one kind, in schedule order
    pub fn activities_of(&self, kind: ActivityKind) -> impl Iterator<Item = &Activity> {
        self.activities
            .iter()
            .filter(move |activity| activity.activity_type == kind)
    }

    /// Ids of the attractions visited on this day
    #[must_use]
    pub fn visited_attraction_ids(&self) -> Vec<i64> {
        self.activities_of(ActivityKind::Attraction)
            .filter_map(|activity| activity.attraction_id)
            .collect()
    }
}

/// A complete multi-day itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Itinerary {
    pub title: String,
    pub description: String,
    pub user_id: Option<i64>,
    pub destination_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hotel_id: Option<i64>,
    pub is_recommended: bool,
    pub days: Vec<DaySchedule>,
}

impl Itinerary {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, reporting malformed dates and times as parse errors
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TripPlanError::parse(e.to_string()))
    }
}

/// An itinerary together with the identifier assigned by its store
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SavedItinerary {
    pub id: u64,
    pub itinerary: Itinerary,
}

/// Destination fields shown next to an itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DestinationSummary {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

/// Hotel fields shown next to an itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelSummary {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
}

impl From<&HotelRecord> for HotelSummary {
    fn from(hotel: &HotelRecord) -> Self {
        Self {
            id: hotel.id,
            name: hotel.name.clone(),
            address: hotel.address.clone(),
            latitude: hotel.latitude,
            longitude: hotel.longitude,
            rating: hotel.rating,
        }
    }
}

/// A saved itinerary with its destination and hotel looked up by id.
///
/// Either lookup is `None` when the catalog used for reading does not list
/// the id (or no catalog was given).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItineraryDetails {
    pub id: u64,
    pub destination: Option<DestinationSummary>,
    pub hotel: Option<HotelSummary>,
    pub itinerary: Itinerary,
}

impl ItineraryDetails {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
